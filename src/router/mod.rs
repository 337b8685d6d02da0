//! Channel Router: dispatches proxy-initiated inbound channels to the two
//! worker kinds the wire protocol defines (§4.4).
//!
//! The original spec describes the router as two independent accept loops,
//! one per channel-type name, each waiting on its own inbound queue. The
//! SSH library this crate is built on delivers every inbound
//! forwarded-tcpip-shaped channel through a single client-handler hook
//! (`server_channel_open_forwarded_tcpip`, see [`crate::session`]) rather
//! than exposing one queue per channel-type string, so the "two accept
//! loops" collapse into dispatch-by-`connected_address` at that single
//! call site; there is no accept loop of our own to write because the SSH
//! library's own event-processing task already is one. Each branch still
//! spawns its worker as an independent task, so a slow splice on one
//! channel never blocks the dispatch of the next inbound channel.

mod access_point;
mod transport;

use std::sync::Arc;

use russh::{Channel, client};
use tracing::warn;

use crate::authority::AuthorityClient;
use crate::protocol;

/// Called synchronously from the client handler on every inbound
/// `forwarded-tcpip`-shaped channel open. Must not block: each recognized
/// channel type is handed to a freshly spawned worker task.
pub(crate) fn dispatch_inbound(
    connected_address: &str,
    channel: Channel<client::Msg>,
    authority: Arc<dyn AuthorityClient>,
) {
    match connected_address {
        protocol::CHANNEL_ACCESS_POINT => {
            tokio::spawn(access_point::serve(channel, authority));
        }
        protocol::CHANNEL_TRANSPORT => {
            tokio::spawn(transport::serve(channel));
        }
        other => {
            warn!(channel_type = other, "rejecting unknown inbound channel type");
            tokio::spawn(async move {
                let _ = channel.close().await;
            });
        }
    }
}
