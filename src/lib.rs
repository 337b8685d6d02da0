//! Reverse-tunnel site agent core.
//!
//! A long-lived, self-healing, SSH-multiplexed outbound connection from a
//! worker node (the "site") to a central rendezvous point (the "proxy").
//! Once connected, the proxy uses the existing connection in reverse to
//! reach a control-plane API near the site and to open opaque TCP streams
//! to hosts reachable from the site.
//!
//! Four cooperating activities make up an [`Agent`]: the Supervisor
//! (reconnect loop with backoff), the Dialer (one connection attempt,
//! authenticating the proxy's host certificate against a rotating set of
//! authorities), the Heartbeater (the sole liveness/fault detector), and
//! the Channel Router (dispatches the proxy's inbound channels to the
//! access-point and transport splice workers). See each module for the
//! component it implements.
//!
//! Out of scope here, by design: credential/authority storage mechanics,
//! the SSH transport library itself, process-level configuration/CLI
//! packaging, and the proxy-side acceptor this agent's peer behavior is
//! constrained by.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]

mod agent;
mod auth;
mod authority;
mod config;
mod dialer;
mod error;
mod heartbeat;
mod hostkey;
mod protocol;
mod router;
mod session;
mod splice;

pub use agent::{Agent, AgentBuilder};
pub use auth::{AgentAuth, AuthMethod, KeyAuth, PasswordAuth};
pub use authority::{Authority, AuthorityClient, ControlPlaneStream, StaticAuthorityClient};
pub use error::AgentError;
pub use hostkey::{CertificateVerifier, HostKeyVerifier, PinnedKeyVerifier};
pub use session::Session;

pub use protocol::{
    CHANNEL_ACCESS_POINT, CHANNEL_HEARTBEAT, CHANNEL_TRANSPORT, HEARTBEAT_PING,
    TRANSPORT_CONNECTED, TRANSPORT_DIAL_REQUEST,
};
