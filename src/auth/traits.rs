//! The authentication-method trait boundary.
//!
//! Unlike the teacher's `AuthStrategy`, whose `AuthChain` tries every
//! strategy against one already-open `client::Handle`, the Dialer here
//! opens a fresh TCP connection and SSH handshake per method (§4.2,
//! §9 "Single-attempt authentication"): a multi-method client sharing one
//! handshake would leak, to a passive observer, which methods are
//! configured. So `AuthMethod` only needs to authenticate an
//! already-connected handle; the Dialer owns the per-attempt connect loop.

use async_trait::async_trait;
use russh::client;

use crate::error::AgentError;
use crate::session::ClientHandler;

/// One credential provider, tried by the Dialer in declared order.
#[async_trait]
pub trait AuthMethod: Send + Sync {
    /// Present this method's credentials on an already-handshaken client
    /// handle. `Ok(true)` means the server accepted; `Ok(false)` means it
    /// was rejected (try the next method); `Err` means the attempt itself
    /// could not be made (e.g. a key file failed to load).
    async fn authenticate(
        &self,
        handle: &mut client::Handle<ClientHandler>,
        username: &str,
    ) -> Result<bool, AgentError>;

    /// Name used only for logging which method is being tried.
    fn name(&self) -> &'static str;
}
