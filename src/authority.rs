//! The Authority Client boundary: where the Dialer gets the current set of
//! host-class certificate authorities, and where the Access-Point Proxy
//! gets a connection to the local control plane.
//!
//! Both the credential/authority store and the control-plane endpoint are
//! explicitly external collaborators; this module only defines the trait
//! boundary plus one concrete, dependency-free implementation suitable for
//! tests and simple deployments.

use std::sync::Arc;

use async_trait::async_trait;
use russh::keys::PublicKey;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::AgentError;

/// A single certificate authority: the set of public keys any of which may
/// have signed a valid host certificate for this authority.
#[derive(Clone)]
pub struct Authority {
    pub checker_keys: Vec<PublicKey>,
}

impl Authority {
    pub fn new(checker_keys: Vec<PublicKey>) -> Self {
        Self { checker_keys }
    }
}

/// A duplex byte stream, the shape the Access-Point Proxy splices against.
/// Blanket-implemented for anything `tokio::io::copy` already accepts, so
/// `TcpStream`, `UnixStream`, or a test double all satisfy it for free.
pub trait ControlPlaneStream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> ControlPlaneStream for T {}

/// External collaborator consulted by the Dialer (for host authorities) and
/// the Access-Point Proxy (for a control-plane connection).
#[async_trait]
pub trait AuthorityClient: Send + Sync {
    /// Return the current set of host-class certificate authorities. Must
    /// not cache: the Dialer calls this once per connection attempt and
    /// relies on it reflecting the latest rotation state.
    async fn host_authorities(&self) -> Result<Vec<Authority>, AgentError>;

    /// Dial a fresh connection to the local control-plane endpoint.
    async fn dial_control_plane(&self) -> Result<Box<dyn ControlPlaneStream>, AgentError>;
}

/// A fixed authority set and a fixed TCP control-plane address. Suitable
/// when authority rotation is handled by replacing the `Arc` the agent
/// holds rather than by the client re-fetching internally.
pub struct StaticAuthorityClient {
    authorities: Vec<Authority>,
    control_plane_addr: String,
}

impl StaticAuthorityClient {
    pub fn new(authorities: Vec<Authority>, control_plane_addr: impl Into<String>) -> Self {
        Self {
            authorities,
            control_plane_addr: control_plane_addr.into(),
        }
    }

    pub fn into_arc(self) -> Arc<dyn AuthorityClient> {
        Arc::new(self)
    }
}

#[async_trait]
impl AuthorityClient for StaticAuthorityClient {
    async fn host_authorities(&self) -> Result<Vec<Authority>, AgentError> {
        Ok(self.authorities.clone())
    }

    async fn dial_control_plane(&self) -> Result<Box<dyn ControlPlaneStream>, AgentError> {
        let stream = tokio::net::TcpStream::connect(&self.control_plane_addr)
            .await
            .map_err(|e| AgentError::DialFailure(e.to_string()))?;
        Ok(Box::new(stream))
    }
}
