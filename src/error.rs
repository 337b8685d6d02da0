//! Error taxonomy for the tunnel agent.
//!
//! Every fault the agent can observe collapses into one of these variants.
//! Unlike the string-classification approach some SSH client code uses to
//! decide whether to retry, every failure here is retried by the Supervisor
//! per the fixed backoff formula, so classification exists for logging and
//! for callers, not for retry routing.

use std::io;

/// Errors produced while dialing, authenticating, or servicing channels on
/// a reverse-tunnel Session.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A configuration value was missing or malformed (e.g. an empty remote
    /// address, or a host string with no parseable port).
    #[error("bad parameter: {0}")]
    BadParameter(String),

    /// The TCP connection, SSH handshake, host-key verification, or
    /// authentication failed.
    #[error("transport/auth failure: {0}")]
    TransportAuth(String),

    /// A presented host certificate was not signed by any known authority.
    #[error("no authority signs the presented host certificate")]
    NotFound,

    /// The peer closed a channel or the session unexpectedly.
    #[error("peer closed the connection")]
    PeerClosed,

    /// An I/O error occurred while splicing a channel to its peer stream.
    #[error("splice failed: {0}")]
    SpliceIo(#[from] io::Error),

    /// Dialing the transport proxy's target address failed.
    #[error("dial failed: {0}")]
    DialFailure(String),

    /// A fault raised internally by the SSH transport library's own event
    /// loop (as opposed to an error this crate classified itself). Needed
    /// so `AgentError` can serve as `client::Handler::Error`, which must
    /// implement `From<russh::Error>`.
    #[error("ssh transport error: {0}")]
    Ssh(#[from] russh::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_parameter_displays_message() {
        let err = AgentError::BadParameter("remote address is empty".into());
        assert_eq!(err.to_string(), "bad parameter: remote address is empty");
    }

    #[test]
    fn splice_io_wraps_io_error() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe");
        let err: AgentError = io_err.into();
        assert!(matches!(err, AgentError::SpliceIo(_)));
    }

    #[test]
    fn not_found_has_fixed_message() {
        assert_eq!(
            AgentError::NotFound.to_string(),
            "no authority signs the presented host certificate"
        );
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AgentError>();
    }
}
