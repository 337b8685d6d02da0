//! Authentication methods tried, one per handshake attempt, by the Dialer.
//!
//! Mirrors the teacher's `mcp::auth` strategy pattern (one trait, one type
//! per credential kind) but without the teacher's `AuthChain`: the original
//! spec requires a fresh connection per method rather than one shared
//! handle tried against every strategy in turn, so the Dialer itself
//! iterates the ordered list (see [`crate::dialer`]).

mod agent;
mod key;
mod password;
mod traits;

pub use agent::AgentAuth;
pub use key::KeyAuth;
pub use password::PasswordAuth;
pub use traits::AuthMethod;
