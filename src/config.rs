//! Timer resolution: explicit parameter, else environment variable, else
//! built-in default. The three timers the protocol defines are fixed by
//! contract with the proxy; the environment-variable overrides exist so
//! tests (and, if ever needed, an embedding binary) can shrink them rather
//! than waiting out real wall-clock periods.

use std::time::Duration;

use crate::error::AgentError;

/// Reconnect backoff is `min(attempt_count, this)` seconds.
pub const DEFAULT_RECONNECT_BACKOFF_CAP_SECS: u64 = 10;

/// Heartbeat `ping` cadence on a live Session.
pub const DEFAULT_HEARTBEAT_PERIOD: Duration = Duration::from_secs(5);

/// How long the Transport Proxy waits for the first data frame (the dial
/// directive) before closing the channel.
pub const DEFAULT_TRANSPORT_DIAL_WAIT: Duration = Duration::from_secs(10);

/// Capacity of the Heartbeater→Supervisor disconnect-signal channel. The
/// Heartbeater delivers with `try_send`, so this only needs to be large
/// enough that a signal is never dropped for lack of buffer space; §3
/// calls for "a small constant, e.g. 10".
pub const DISCONNECT_SIGNAL_CAPACITY: usize = 10;

pub const ENV_RECONNECT_BACKOFF_CAP_SECS: &str = "TUNNEL_AGENT_RECONNECT_BACKOFF_CAP_SECS";
pub const ENV_HEARTBEAT_PERIOD_MS: &str = "TUNNEL_AGENT_HEARTBEAT_PERIOD_MS";
pub const ENV_TRANSPORT_DIAL_WAIT_MS: &str = "TUNNEL_AGENT_TRANSPORT_DIAL_WAIT_MS";

/// Unlike the three timers above, the remote address and site identity
/// have no sensible built-in default; they name a specific deployment.
/// These env vars exist only as the second tier of the same
/// explicit-else-env-else-default resolution order; there is no third
/// tier, so a caller that supplies neither gets a [`AgentError::BadParameter`].
pub const ENV_REMOTE_ADDR: &str = "TUNNEL_AGENT_REMOTE_ADDR";
pub const ENV_SITE_IDENTITY: &str = "TUNNEL_AGENT_SITE_IDENTITY";

/// Resolve the reconnect backoff cap: explicit value, else env var, else
/// [`DEFAULT_RECONNECT_BACKOFF_CAP_SECS`].
pub fn resolve_reconnect_backoff_cap_secs(explicit: Option<u64>) -> u64 {
    if let Some(v) = explicit {
        return v;
    }
    std::env::var(ENV_RECONNECT_BACKOFF_CAP_SECS)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_RECONNECT_BACKOFF_CAP_SECS)
}

/// Resolve the heartbeat period: explicit value, else env var, else
/// [`DEFAULT_HEARTBEAT_PERIOD`].
pub fn resolve_heartbeat_period(explicit: Option<Duration>) -> Duration {
    if let Some(v) = explicit {
        return v;
    }
    std::env::var(ENV_HEARTBEAT_PERIOD_MS)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_HEARTBEAT_PERIOD)
}

/// Resolve the transport first-frame wait: explicit value, else env var,
/// else [`DEFAULT_TRANSPORT_DIAL_WAIT`].
pub fn resolve_transport_dial_wait(explicit: Option<Duration>) -> Duration {
    if let Some(v) = explicit {
        return v;
    }
    std::env::var(ENV_TRANSPORT_DIAL_WAIT_MS)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TRANSPORT_DIAL_WAIT)
}

/// Resolve the remote proxy address: explicit value, else
/// [`ENV_REMOTE_ADDR`], else a bad-parameter error (§4.1: an empty/missing
/// remote address fails `Start` rather than being retried).
pub fn resolve_remote_address(explicit: Option<String>) -> Result<String, AgentError> {
    if let Some(v) = explicit.filter(|v| !v.is_empty()) {
        return Ok(v);
    }
    std::env::var(ENV_REMOTE_ADDR)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AgentError::BadParameter("remote address is empty".into()))
}

/// Resolve the site identity: explicit value, else [`ENV_SITE_IDENTITY`],
/// else a bad-parameter error.
pub fn resolve_site_identity(explicit: Option<String>) -> Result<String, AgentError> {
    if let Some(v) = explicit.filter(|v| !v.is_empty()) {
        return Ok(v);
    }
    std::env::var(ENV_SITE_IDENTITY)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AgentError::BadParameter("site identity is empty".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes tests that mutate process environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) };
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    #[test]
    fn explicit_value_wins_over_everything() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_env(ENV_RECONNECT_BACKOFF_CAP_SECS, "99");
        assert_eq!(resolve_reconnect_backoff_cap_secs(Some(3)), 3);
        remove_env(ENV_RECONNECT_BACKOFF_CAP_SECS);
    }

    #[test]
    fn env_var_wins_over_default() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_env(ENV_RECONNECT_BACKOFF_CAP_SECS, "7");
        assert_eq!(resolve_reconnect_backoff_cap_secs(None), 7);
        remove_env(ENV_RECONNECT_BACKOFF_CAP_SECS);
    }

    #[test]
    fn default_used_when_nothing_set() {
        let _guard = ENV_LOCK.lock().unwrap();
        remove_env(ENV_RECONNECT_BACKOFF_CAP_SECS);
        assert_eq!(
            resolve_reconnect_backoff_cap_secs(None),
            DEFAULT_RECONNECT_BACKOFF_CAP_SECS
        );
    }

    #[test]
    fn heartbeat_period_env_var_is_milliseconds() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_env(ENV_HEARTBEAT_PERIOD_MS, "250");
        assert_eq!(resolve_heartbeat_period(None), Duration::from_millis(250));
        remove_env(ENV_HEARTBEAT_PERIOD_MS);
    }

    #[test]
    fn transport_dial_wait_defaults_to_ten_seconds() {
        let _guard = ENV_LOCK.lock().unwrap();
        remove_env(ENV_TRANSPORT_DIAL_WAIT_MS);
        assert_eq!(
            resolve_transport_dial_wait(None),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn malformed_env_var_falls_back_to_default() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_env(ENV_RECONNECT_BACKOFF_CAP_SECS, "not-a-number");
        assert_eq!(
            resolve_reconnect_backoff_cap_secs(None),
            DEFAULT_RECONNECT_BACKOFF_CAP_SECS
        );
        remove_env(ENV_RECONNECT_BACKOFF_CAP_SECS);
    }

    #[test]
    fn remote_address_explicit_wins() {
        let _guard = ENV_LOCK.lock().unwrap();
        assert_eq!(
            resolve_remote_address(Some("127.0.0.1:3022".into())).unwrap(),
            "127.0.0.1:3022"
        );
    }

    #[test]
    fn remote_address_falls_back_to_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_env(ENV_REMOTE_ADDR, "proxy.example:3022");
        assert_eq!(
            resolve_remote_address(None).unwrap(),
            "proxy.example:3022"
        );
        remove_env(ENV_REMOTE_ADDR);
    }

    #[test]
    fn remote_address_missing_is_bad_parameter() {
        let _guard = ENV_LOCK.lock().unwrap();
        remove_env(ENV_REMOTE_ADDR);
        assert!(matches!(
            resolve_remote_address(None),
            Err(AgentError::BadParameter(_))
        ));
    }

    #[test]
    fn remote_address_explicit_empty_string_is_bad_parameter() {
        let _guard = ENV_LOCK.lock().unwrap();
        remove_env(ENV_REMOTE_ADDR);
        assert!(matches!(
            resolve_remote_address(Some(String::new())),
            Err(AgentError::BadParameter(_))
        ));
    }

    #[test]
    fn site_identity_missing_is_bad_parameter() {
        let _guard = ENV_LOCK.lock().unwrap();
        remove_env(ENV_SITE_IDENTITY);
        assert!(matches!(
            resolve_site_identity(None),
            Err(AgentError::BadParameter(_))
        ));
    }
}
