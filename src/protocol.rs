//! Wire-level constants shared with the rendezvous proxy.
//!
//! These names are a contract with the peer and must be preserved exactly;
//! nothing in this crate should construct these strings ad hoc elsewhere.

/// Opened by the agent immediately after connect. Carries `ping` every
/// [`crate::config::HEARTBEAT_PERIOD`]; inbound data on this channel is
/// informational and requires no reply.
pub const CHANNEL_HEARTBEAT: &str = "teleport-heartbeat";

/// Opened by the proxy. Spliced directly to a freshly dialed control-plane
/// connection.
pub const CHANNEL_ACCESS_POINT: &str = "teleport-access-point";

/// Opened by the proxy. The first data frame received on the channel is
/// interpreted as an ASCII `host:port` dial target; once dialed, the agent
/// writes back `connected` and splices raw bytes thereafter.
pub const CHANNEL_TRANSPORT: &str = "teleport-transport";

/// Reserved request name for the dial directive on a transport channel.
/// The peer uses this name when it sends the directive as a named channel
/// request; since the underlying SSH library exposes no generic inbound
/// channel-request primitive on a client-held channel, the agent reads the
/// directive positionally (as the first `Data` frame) and does not inspect
/// the request name.
pub const TRANSPORT_DIAL_REQUEST: &str = "teleport-transport-dial";

/// Payload written back on the transport channel once the dial succeeds.
pub const TRANSPORT_CONNECTED: &[u8] = b"connected";

/// Fire-and-forget payload sent on the heartbeat channel every period.
pub const HEARTBEAT_PING: &str = "ping";
