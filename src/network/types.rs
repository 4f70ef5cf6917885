use std::fmt;
use std::time::Duration;

/// Maximum idle connections kept per peer.
///
/// Kept small so that reconnections show up as local address changes
/// instead of being absorbed by a large pool.
pub const MAX_IDLE_PER_HOST: usize = 10;

/// Upper bound on a whole probe exchange (connect, send, body drain).
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Health-check path requested on every peer.
pub const PING_PATH: &str = "/ping";

/// A remote endpoint identified by its `host:port` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Peer(String);

impl Peer {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL of the peer's health-check endpoint
    pub fn ping_url(&self) -> String {
        format!("http://{}{}", self.0, PING_PATH)
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
