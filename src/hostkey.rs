//! Host-key verification: the Dialer accepts the proxy's host key only if
//! it is an SSH certificate signed by one of the currently-declared
//! checker keys of a host-class authority.

use std::sync::Arc;

use async_trait::async_trait;
use russh::keys::{Certificate, KeyData, PublicKey};
use tracing::debug;

use crate::authority::AuthorityClient;
use crate::error::AgentError;

/// Decides whether a presented host key should be trusted.
#[async_trait]
pub trait HostKeyVerifier: Send + Sync {
    async fn verify(&self, host_port: &str, presented: &PublicKey) -> Result<bool, AgentError>;
}

/// Accepts a host certificate iff its signing key matches a checker key of
/// one of the authority's currently-declared host-class authorities. The
/// authority set is fetched fresh on every call; nothing here caches it.
pub struct CertificateVerifier {
    authority: Arc<dyn AuthorityClient>,
}

impl CertificateVerifier {
    pub fn new(authority: Arc<dyn AuthorityClient>) -> Self {
        Self { authority }
    }
}

#[async_trait]
impl HostKeyVerifier for CertificateVerifier {
    async fn verify(&self, host_port: &str, presented: &PublicKey) -> Result<bool, AgentError> {
        let cert = match presented.key_data() {
            KeyData::Certificate(cert) => cert,
            _ => {
                debug!(host = host_port, "presented host key is not a certificate");
                return Ok(false);
            }
        };

        let authorities = self.authority.host_authorities().await?;
        Ok(signed_by_any(cert, &authorities_checker_keys(&authorities)))
    }
}

fn authorities_checker_keys(authorities: &[crate::authority::Authority]) -> Vec<&PublicKey> {
    authorities
        .iter()
        .flat_map(|a| a.checker_keys.iter())
        .collect()
}

/// Core matching logic, isolated so it can be unit tested without a fake
/// `AuthorityClient`: a host certificate is trusted iff its signing key is
/// byte-identical to one of the supplied checker keys.
fn signed_by_any(cert: &Certificate, checker_keys: &[&PublicKey]) -> bool {
    checker_keys.iter().any(|k| k.key_data() == cert.signature_key())
}

/// Accepts exactly one pinned public key. Useful for tests and for
/// deployments that want to skip authority rotation entirely.
pub struct PinnedKeyVerifier {
    pinned: PublicKey,
}

impl PinnedKeyVerifier {
    pub fn new(pinned: PublicKey) -> Self {
        Self { pinned }
    }
}

#[async_trait]
impl HostKeyVerifier for PinnedKeyVerifier {
    async fn verify(&self, _host_port: &str, presented: &PublicKey) -> Result<bool, AgentError> {
        Ok(presented == &self.pinned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::{Authority, StaticAuthorityClient};
    use russh::keys::{
        certificate::{Builder, CertType},
        Algorithm, PrivateKey,
    };

    fn fresh_key() -> PrivateKey {
        PrivateKey::random(&mut rand::rngs::OsRng, Algorithm::Ed25519).unwrap()
    }

    fn host_certificate_signed_by(ca: &PrivateKey, subject: &PrivateKey) -> PublicKey {
        let mut builder = Builder::new_with_random_nonce(
            &mut rand::rngs::OsRng,
            subject.public_key(),
            0,
            u64::MAX,
        )
        .unwrap();
        builder.cert_type(CertType::Host).unwrap();
        builder.valid_principal("proxy.internal").unwrap();
        let cert = builder.sign(ca).unwrap();
        PublicKey::new(KeyData::Certificate(Box::new(cert)), "")
    }

    #[tokio::test]
    async fn accepts_certificate_signed_by_known_authority() {
        let ca = fresh_key();
        let host = fresh_key();
        let presented = host_certificate_signed_by(&ca, &host);

        let authority = StaticAuthorityClient::new(
            vec![Authority::new(vec![ca.public_key().clone()])],
            "127.0.0.1:1",
        )
        .into_arc();
        let verifier = CertificateVerifier::new(authority);

        assert!(verifier.verify("127.0.0.1:33001", &presented).await.unwrap());
    }

    #[tokio::test]
    async fn rejects_certificate_signed_by_unknown_authority() {
        let ca = fresh_key();
        let unrelated_ca = fresh_key();
        let host = fresh_key();
        let presented = host_certificate_signed_by(&ca, &host);

        let authority = StaticAuthorityClient::new(
            vec![Authority::new(vec![unrelated_ca.public_key().clone()])],
            "127.0.0.1:1",
        )
        .into_arc();
        let verifier = CertificateVerifier::new(authority);

        assert!(!verifier
            .verify("127.0.0.1:33001", &presented)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn rejects_a_bare_key_with_no_certificate() {
        let bare = fresh_key();
        let authority = StaticAuthorityClient::new(vec![], "127.0.0.1:1").into_arc();
        let verifier = CertificateVerifier::new(authority);

        assert!(!verifier
            .verify("127.0.0.1:33001", bare.public_key())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn pinned_verifier_accepts_only_the_pinned_key() {
        let a = fresh_key();
        let b = fresh_key();
        let verifier = PinnedKeyVerifier::new(a.public_key().clone());

        assert!(verifier.verify("host:22", a.public_key()).await.unwrap());
        assert!(!verifier.verify("host:22", b.public_key()).await.unwrap());
    }
}
