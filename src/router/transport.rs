//! Transport Proxy (§4.4.2): reads a dial target from the first inbound
//! frame on an accepted `teleport-transport` channel, dials it over plain
//! TCP, and splices.

use russh::{Channel, ChannelMsg, client};
use tracing::{debug, warn};

use crate::config::resolve_transport_dial_wait;
use crate::protocol;
use crate::splice;

pub(super) async fn serve(channel: Channel<client::Msg>) {
    let wait = resolve_transport_dial_wait(None);

    // The first frame actually delivered is not necessarily the dial
    // request: russh can surface benign control frames (e.g. a window
    // adjustment) on a freshly accepted channel before any `Data` arrives.
    // Keep draining within the overall wait budget until a `Data` frame,
    // a close, or the timeout settles it.
    let wait_for_request = async {
        loop {
            match channel.wait().await {
                Some(ChannelMsg::Data { data }) => return Some(data),
                Some(_other) => continue,
                None => return None,
            }
        }
    };

    let first = match tokio::time::timeout(wait, wait_for_request).await {
        Ok(Some(data)) => data,
        Ok(None) => {
            debug!("transport proxy: channel closed before a dial request arrived");
            return;
        }
        Err(_) => {
            debug!(?wait, "transport proxy: no dial request within timeout, closing");
            let _ = channel.close().await;
            return;
        }
    };

    let target = match std::str::from_utf8(&first) {
        Ok(s) => s.to_string(),
        Err(_) => {
            warn!("transport proxy: dial target was not valid UTF-8, closing");
            let _ = channel.close().await;
            return;
        }
    };

    let stream = match tokio::net::TcpStream::connect(&target).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(target, error = %e, "transport proxy: dial failed");
            let _ = channel.close().await;
            return;
        }
    };

    if let Err(e) = channel.data(protocol::TRANSPORT_CONNECTED).await {
        warn!(error = %e, "transport proxy: failed to ack connect, closing");
        return;
    }

    let stream_channel = channel.into_stream();
    if let Err(e) = splice::bidirectional(stream_channel, stream).await {
        debug!(error = %e, "transport splice ended");
    }
}
