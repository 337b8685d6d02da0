//! Access-Point Proxy (§4.4.1): splices one accepted
//! `teleport-access-point` channel to a freshly dialed control-plane
//! connection.

use std::sync::Arc;

use russh::{Channel, client};
use tracing::{debug, warn};

use crate::authority::AuthorityClient;
use crate::splice;

pub(super) async fn serve(channel: Channel<client::Msg>, authority: Arc<dyn AuthorityClient>) {
    let control_plane = match authority.dial_control_plane().await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "access-point proxy: failed to dial control plane");
            let _ = channel.close().await;
            return;
        }
    };

    let stream = channel.into_stream();
    if let Err(e) = splice::bidirectional(stream, control_plane).await {
        debug!(error = %e, "access-point splice ended");
    }
}
