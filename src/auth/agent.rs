//! SSH-agent authentication method (`SSH_AUTH_SOCK`).

use async_trait::async_trait;
use russh::client;
use tracing::debug;

use crate::error::AgentError;
use crate::session::ClientHandler;

use super::traits::AuthMethod;

/// Tries every identity the running agent offers, in the order the agent
/// returns them, stopping at the first accepted one.
pub struct AgentAuth;

impl AgentAuth {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AgentAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthMethod for AgentAuth {
    async fn authenticate(
        &self,
        handle: &mut client::Handle<ClientHandler>,
        username: &str,
    ) -> Result<bool, AgentError> {
        let mut agent = russh::keys::agent::client::AgentClient::connect_env()
            .await
            .map_err(|e| AgentError::TransportAuth(format!("connecting to ssh-agent: {e}")))?;

        let identities = agent
            .request_identities()
            .await
            .map_err(|e| AgentError::TransportAuth(format!("listing agent identities: {e}")))?;

        for identity in identities {
            debug!(comment = ?identity.comment(), "trying ssh-agent identity");
            let hash_alg = handle
                .best_supported_rsa_hash()
                .await
                .ok()
                .flatten()
                .flatten();

            match handle
                .authenticate_publickey_with(username, identity.clone(), hash_alg, &mut agent)
                .await
            {
                Ok(result) if result.success() => return Ok(true),
                Ok(_) => continue,
                Err(e) => {
                    debug!(error = %e, "agent identity rejected, trying next");
                    continue;
                }
            }
        }

        Ok(false)
    }

    fn name(&self) -> &'static str {
        "agent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_agent() {
        assert_eq!(AgentAuth::new().name(), "agent");
    }
}
