//! The top-level [`Agent`]: bound at construction to one proxy address,
//! one site identity, and one credential bundle (§3). Owns the Supervisor
//! reconnect loop and the disconnect-signal channel the Heartbeater
//! signals on.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::authority::AuthorityClient;
use crate::auth::AuthMethod;
use crate::config;
use crate::dialer;
use crate::error::AgentError;
use crate::heartbeat;
use crate::hostkey::{CertificateVerifier, HostKeyVerifier};
use crate::session::Session;

/// A long-lived reverse-tunnel agent. Construct via [`AgentBuilder`],
/// then call [`Agent::start`].
pub struct Agent {
    remote: String,
    site: String,
    auth_methods: Vec<Box<dyn AuthMethod>>,
    verifier: Arc<dyn HostKeyVerifier>,
    authority: Arc<dyn AuthorityClient>,
    heartbeat_period: Duration,
    reconnect_backoff_cap_secs: u64,

    session_tx: watch::Sender<Option<Arc<Session>>>,
    session_rx: watch::Receiver<Option<Arc<Session>>>,
    disconnect_tx: mpsc::Sender<()>,
    // Held behind a Mutex only so `supervise` (the sole reader) can take
    // ownership across `.await` points inside a `&self` method; nothing
    // else ever touches it. The Supervisor is still the single logical
    // writer/reader of reconnect state (§5 design note).
    disconnect_rx: tokio::sync::Mutex<mpsc::Receiver<()>>,
    termination: Notify,
}

impl Agent {
    /// Start a builder bound to `authority` (the external collaborator
    /// providing host authorities and control-plane connections).
    pub fn builder(authority: Arc<dyn AuthorityClient>) -> AgentBuilder {
        AgentBuilder::new(authority)
    }

    /// Initiates the first connect attempt synchronously (retrying with
    /// backoff on transient failure, per §4.1); returns once a Session is
    /// live and the heartbeater is running, or fails immediately if
    /// construction inputs are invalid. After returning `Ok`, the
    /// Supervisor continues running in the background, reconnecting on
    /// every disconnect signal, until the process exits.
    pub async fn start(self: &Arc<Self>) -> Result<(), AgentError> {
        let session = self.connect_with_backoff().await?;
        self.install_session(session);

        let supervisor = Arc::clone(self);
        tokio::spawn(async move { supervisor.supervise().await });

        Ok(())
    }

    /// Blocks until the termination latch fires. Termination is not
    /// implemented in this core (§9 open question, resolved): the latch
    /// is never signaled internally, so absent an embedding binary racing
    /// this against its own shutdown signal, this call blocks forever.
    pub async fn wait(&self) {
        self.termination.notified().await;
    }

    /// The live Session, if any, at the moment of the call. Per §5's
    /// single-writer discipline, this is a snapshot; a caller that holds
    /// onto the returned `Arc` is unaffected by a subsequent reconnect.
    pub fn current_session(&self) -> Option<Arc<Session>> {
        self.session_rx.borrow().clone()
    }

    async fn supervise(self: Arc<Self>) {
        loop {
            let mut rx = self.disconnect_rx.lock().await;
            if rx.recv().await.is_none() {
                debug!("agent: all disconnect senders dropped, supervisor exiting");
                return;
            }
            drop(rx);

            info!(remote = self.remote, "agent: reconnecting after disconnect signal");
            match self.connect_with_backoff().await {
                Ok(session) => self.install_session(session),
                Err(e) => {
                    error!(error = %e, "agent: supervisor aborting on bad-parameter error");
                    return;
                }
            }
        }
    }

    /// The reconnect loop itself (§4.1): attempt connect; on a
    /// bad-parameter failure, give up immediately (it will not resolve
    /// itself by retrying); on any other failure, sleep `min(attempt, cap)`
    /// seconds and try again. The attempt counter resets to zero on every
    /// call (i.e. on every fresh outage), matching "resets on successful
    /// connect" (§3 invariant).
    async fn connect_with_backoff(&self) -> Result<Session, AgentError> {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            match dialer::connect(
                &self.remote,
                &self.site,
                &self.auth_methods,
                self.verifier.clone(),
                self.authority.clone(),
            )
            .await
            {
                Ok(session) => return Ok(session),
                Err(e @ AgentError::BadParameter(_)) => return Err(e),
                Err(e) => {
                    let delay = attempt.min(self.reconnect_backoff_cap_secs);
                    warn!(
                        attempt,
                        delay_secs = delay,
                        error = %e,
                        "agent: connect attempt failed, backing off"
                    );
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                }
            }
        }
    }

    fn install_session(&self, session: Session) {
        let session = Arc::new(session);
        let _ = self.session_tx.send(Some(session.clone()));

        let disconnect_tx = self.disconnect_tx.clone();
        let period = self.heartbeat_period;
        tokio::spawn(async move {
            heartbeat::run(&session, disconnect_tx, period).await;
        });
    }
}

/// Builds an [`Agent`]. Remote address and site identity resolve
/// explicit-else-environment-variable-else-error (see [`config`]); the
/// host-key verifier defaults to [`CertificateVerifier`] and is
/// overridable (the "ad-hoc" flavor, §4.2).
pub struct AgentBuilder {
    remote: Option<String>,
    site: Option<String>,
    auth_methods: Vec<Box<dyn AuthMethod>>,
    verifier: Option<Arc<dyn HostKeyVerifier>>,
    authority: Arc<dyn AuthorityClient>,
    heartbeat_period: Option<Duration>,
    reconnect_backoff_cap_secs: Option<u64>,
}

impl AgentBuilder {
    pub fn new(authority: Arc<dyn AuthorityClient>) -> Self {
        Self {
            remote: None,
            site: None,
            auth_methods: Vec::new(),
            verifier: None,
            authority,
            heartbeat_period: None,
            reconnect_backoff_cap_secs: None,
        }
    }

    pub fn remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }

    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Append an auth method; methods are tried in the order added.
    pub fn auth_method(mut self, method: Box<dyn AuthMethod>) -> Self {
        self.auth_methods.push(method);
        self
    }

    /// Override the default certificate-chain verifier (the "ad-hoc"
    /// flavor: a single out-of-band-pinned key instead of authority
    /// rotation).
    pub fn host_key_verifier(mut self, verifier: Arc<dyn HostKeyVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn heartbeat_period(mut self, period: Duration) -> Self {
        self.heartbeat_period = Some(period);
        self
    }

    pub fn reconnect_backoff_cap_secs(mut self, cap: u64) -> Self {
        self.reconnect_backoff_cap_secs = Some(cap);
        self
    }

    pub fn build(self) -> Result<Agent, AgentError> {
        let remote = config::resolve_remote_address(self.remote)?;
        let site = config::resolve_site_identity(self.site)?;
        let verifier = self
            .verifier
            .unwrap_or_else(|| Arc::new(CertificateVerifier::new(self.authority.clone())));
        let heartbeat_period = config::resolve_heartbeat_period(self.heartbeat_period);
        let reconnect_backoff_cap_secs =
            config::resolve_reconnect_backoff_cap_secs(self.reconnect_backoff_cap_secs);

        let (session_tx, session_rx) = watch::channel(None);
        let (disconnect_tx, disconnect_rx) = mpsc::channel(config::DISCONNECT_SIGNAL_CAPACITY);

        Ok(Agent {
            remote,
            site,
            auth_methods: self.auth_methods,
            verifier,
            authority: self.authority,
            heartbeat_period,
            reconnect_backoff_cap_secs,
            session_tx,
            session_rx,
            disconnect_tx,
            disconnect_rx: tokio::sync::Mutex::new(disconnect_rx),
            termination: Notify::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::StaticAuthorityClient;
    use crate::auth::PasswordAuth;

    fn authority() -> Arc<dyn AuthorityClient> {
        StaticAuthorityClient::new(vec![], "127.0.0.1:1").into_arc()
    }

    #[test]
    fn build_fails_without_remote_address() {
        let result = Agent::builder(authority())
            .site("site-1")
            .auth_method(Box::new(PasswordAuth::new("x")))
            .build();
        assert!(matches!(result, Err(AgentError::BadParameter(_))));
    }

    #[test]
    fn build_fails_without_site_identity() {
        let result = Agent::builder(authority())
            .remote("127.0.0.1:33001")
            .auth_method(Box::new(PasswordAuth::new("x")))
            .build();
        assert!(matches!(result, Err(AgentError::BadParameter(_))));
    }

    #[test]
    fn build_succeeds_with_required_fields() {
        let agent = Agent::builder(authority())
            .remote("127.0.0.1:33001")
            .site("site-1")
            .auth_method(Box::new(PasswordAuth::new("x")))
            .build()
            .unwrap();
        assert!(agent.current_session().is_none());
    }

    #[tokio::test]
    async fn start_fails_fast_on_bad_parameter_without_connecting() {
        // No auth methods configured: dialer::connect returns BadParameter
        // immediately, so `start` must not retry or hang.
        let agent = Arc::new(
            Agent::builder(authority())
                .remote("127.0.0.1:1")
                .site("site-1")
                .build()
                .unwrap(),
        );
        let result = tokio::time::timeout(Duration::from_secs(2), agent.start()).await;
        assert!(matches!(
            result.unwrap(),
            Err(AgentError::BadParameter(_))
        ));
    }
}
