//! Heartbeater (§4.3): opens the dedicated heartbeat channel immediately
//! after connect, emits periodic `ping` requests, and drains whatever the
//! proxy sends back on the same channel. This is the sole fault detector
//! for a live Session; no transport-level read timeout is relied on.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::protocol;
use crate::session::Session;

/// Runs until the Session faults (a failed `ping` send, or the peer
/// closing the heartbeat channel), then emits exactly one value on
/// `disconnect_tx` and returns. `disconnect_tx` is a buffered sender used
/// with `try_send` so a faulting Heartbeater never blocks on delivery.
pub(crate) async fn run(session: &Session, disconnect_tx: mpsc::Sender<()>, period: Duration) {
    let mut channel = match session.handle().channel_open_session().await {
        Ok(channel) => channel,
        Err(e) => {
            warn!(remote = %session.remote, error = %e, "heartbeater: failed to open heartbeat channel");
            signal_disconnect(&disconnect_tx);
            return;
        }
    };

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; consume it so the first ping lands
    // at T=period rather than T=0.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = channel.exec(false, protocol::HEARTBEAT_PING).await {
                    warn!(remote = %session.remote, error = %e, "heartbeater: ping send failed");
                    break;
                }
            }
            msg = channel.wait() => {
                match msg {
                    Some(_) => {
                        debug!(remote = %session.remote, "heartbeater: drained inbound heartbeat message");
                    }
                    None => {
                        debug!(remote = %session.remote, "heartbeater: heartbeat channel closed by peer");
                        break;
                    }
                }
            }
        }
    }

    signal_disconnect(&disconnect_tx);
}

fn signal_disconnect(tx: &mpsc::Sender<()>) {
    if tx.try_send(()).is_err() {
        debug!("heartbeater: disconnect signal already pending, dropping duplicate");
    }
}
