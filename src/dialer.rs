//! Dialer (§4.2): one connection attempt. Tries each configured
//! authentication method against a *fresh* TCP connection and SSH
//! handshake, in declared order, stopping at the first method the proxy
//! accepts. Host-key verification (and the authority fetch behind it,
//! see [`crate::hostkey`]) therefore happens once per handshake attempt,
//! i.e. once per auth method tried; never cached across attempts.

use std::sync::Arc;
use std::time::Duration;

use russh::client;
use tracing::{debug, warn};

use crate::authority::AuthorityClient;
use crate::auth::AuthMethod;
use crate::error::AgentError;
use crate::hostkey::HostKeyVerifier;
use crate::session::{ClientHandler, Session};

fn client_config() -> Arc<client::Config> {
    Arc::new(client::Config {
        // The heartbeat is the sole liveness detector (§4.3); no
        // transport-level inactivity timeout is layered on top of it.
        inactivity_timeout: None,
        keepalive_interval: Some(Duration::from_secs(30)),
        keepalive_max: 3,
        ..Default::default()
    })
}

/// One Dialer attempt, per §4.2's numbered algorithm.
pub(crate) async fn connect(
    remote: &str,
    site: &str,
    methods: &[Box<dyn AuthMethod>],
    verifier: Arc<dyn HostKeyVerifier>,
    authority: Arc<dyn AuthorityClient>,
) -> Result<Session, AgentError> {
    if remote.is_empty() {
        return Err(AgentError::BadParameter("remote address is empty".into()));
    }
    if methods.is_empty() {
        return Err(AgentError::BadParameter(
            "no authentication methods configured".into(),
        ));
    }

    let config = client_config();
    let mut last_err: Option<AgentError> = None;

    for method in methods {
        debug!(remote, site, method = method.name(), "dialer: attempting auth method");

        let handler = ClientHandler::new(remote.to_string(), verifier.clone(), authority.clone());
        let mut handle = match client::connect(config.clone(), remote, handler).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(remote, method = method.name(), error = %e, "dialer: handshake failed");
                last_err = Some(e);
                continue;
            }
        };

        match method.authenticate(&mut handle, site).await {
            Ok(true) => {
                debug!(remote, site, method = method.name(), "dialer: authenticated");
                return Ok(Session::new(handle, site.to_string(), remote.to_string()));
            }
            Ok(false) => {
                debug!(remote, method = method.name(), "dialer: method rejected");
                last_err = Some(AgentError::TransportAuth(format!(
                    "{} authentication rejected",
                    method.name()
                )));
            }
            Err(e) => {
                warn!(remote, method = method.name(), error = %e, "dialer: auth attempt errored");
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| AgentError::TransportAuth("all authentication methods failed".into())))
}
