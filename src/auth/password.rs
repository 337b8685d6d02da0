//! Password authentication method.

use async_trait::async_trait;
use russh::client;

use crate::error::AgentError;
use crate::session::ClientHandler;

use super::traits::AuthMethod;

pub struct PasswordAuth {
    password: String,
}

impl PasswordAuth {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }
}

#[async_trait]
impl AuthMethod for PasswordAuth {
    async fn authenticate(
        &self,
        handle: &mut client::Handle<ClientHandler>,
        username: &str,
    ) -> Result<bool, AgentError> {
        let result = handle
            .authenticate_password(username, &self.password)
            .await
            .map_err(|e| AgentError::TransportAuth(e.to_string()))?;
        Ok(result.success())
    }

    fn name(&self) -> &'static str {
        "password"
    }
}
