//! Private-key-file authentication method.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use russh::{client, keys};
use tracing::debug;

use crate::error::AgentError;
use crate::session::ClientHandler;

use super::traits::AuthMethod;

/// Loads a private key from disk on every attempt (no caching: if the key
/// file is rotated between reconnects, the next attempt picks up the new
/// one without restarting the agent).
pub struct KeyAuth {
    key_path: PathBuf,
    passphrase: Option<String>,
}

impl KeyAuth {
    pub fn new(key_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
            passphrase: None,
        }
    }

    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }
}

#[async_trait]
impl AuthMethod for KeyAuth {
    async fn authenticate(
        &self,
        handle: &mut client::Handle<ClientHandler>,
        username: &str,
    ) -> Result<bool, AgentError> {
        let path = Path::new(&self.key_path);
        let key_pair = keys::load_secret_key(path, self.passphrase.as_deref())
            .map_err(|e| AgentError::TransportAuth(format!("loading {:?}: {e}", self.key_path)))?;

        let hash_alg = handle
            .best_supported_rsa_hash()
            .await
            .ok()
            .flatten()
            .flatten();
        debug!(?hash_alg, "using rsa hash algorithm for key auth");

        let key_with_hash = keys::PrivateKeyWithHashAlg::new(Arc::new(key_pair), hash_alg);

        let result = handle
            .authenticate_publickey(username, key_with_hash)
            .await
            .map_err(|e| AgentError::TransportAuth(e.to_string()))?;
        Ok(result.success())
    }

    fn name(&self) -> &'static str {
        "key"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_key() {
        assert_eq!(KeyAuth::new("/path/to/key").name(), "key");
    }
}
