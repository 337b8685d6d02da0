//! The live Session: a connected, authenticated SSH handle plus the
//! `client::Handler` implementation that backs it.

use std::sync::Arc;
use std::time::Instant;

use russh::client;
use russh::keys::PublicKey;
use russh::{Channel, ChannelId};
use tracing::debug;

use crate::authority::AuthorityClient;
use crate::error::AgentError;
use crate::hostkey::HostKeyVerifier;
use crate::router;

/// Dispatches server-initiated events for one connected handle. Constructed
/// fresh for every handshake attempt, so host-key verification (and the
/// authority fetch behind it) never reuses state across attempts.
pub(crate) struct ClientHandler {
    host_port: String,
    verifier: Arc<dyn HostKeyVerifier>,
    authority: Arc<dyn AuthorityClient>,
}

impl ClientHandler {
    pub(crate) fn new(
        host_port: String,
        verifier: Arc<dyn HostKeyVerifier>,
        authority: Arc<dyn AuthorityClient>,
    ) -> Self {
        Self {
            host_port,
            verifier,
            authority,
        }
    }
}

impl client::Handler for ClientHandler {
    type Error = AgentError;

    async fn check_server_key(&mut self, server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        self.verifier.verify(&self.host_port, server_public_key).await
    }

    async fn server_channel_open_forwarded_tcpip(
        &mut self,
        channel: Channel<client::Msg>,
        connected_address: &str,
        connected_port: u32,
        originator_address: &str,
        originator_port: u32,
        _session: &mut client::Session,
    ) -> Result<(), Self::Error> {
        debug!(
            host = self.host_port,
            connected_address,
            connected_port,
            originator_address,
            originator_port,
            "inbound channel open"
        );
        router::dispatch_inbound(connected_address, channel, self.authority.clone());
        Ok(())
    }
}

/// A live, authenticated SSH session to the proxy. At most one is current
/// per Agent; the Supervisor is the sole writer of that slot, so this type
/// carries no internal locking of its own.
pub struct Session {
    handle: Arc<client::Handle<ClientHandler>>,
    pub site: String,
    pub remote: String,
    established_at: Instant,
}

impl Session {
    pub(crate) fn new(handle: client::Handle<ClientHandler>, site: String, remote: String) -> Self {
        Self {
            handle: Arc::new(handle),
            site,
            remote,
            established_at: Instant::now(),
        }
    }

    pub(crate) fn handle(&self) -> &client::Handle<ClientHandler> {
        &self.handle
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.established_at.elapsed()
    }

    /// True once the underlying connection has been torn down on our side.
    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    pub(crate) async fn close_channel(&self, id: ChannelId) {
        let _ = self.handle.channel_close(id).await;
    }
}
