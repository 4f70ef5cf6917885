//! Peer-facing network layer
//!
//! One persistent HTTP client per peer, each dialing through its own
//! [`TrackingConnector`] so that silent reconnections become visible as a
//! change of local socket address.

pub mod client;
pub mod error;
pub mod tracker;
pub mod types;

pub use client::{PeerClient, PeerClientSet, PeerTransport};
pub use error::{ProbeError, ProbeResult};
pub use tracker::{ConnectionRecord, TrackingConnector};
pub use types::{Peer, MAX_IDLE_PER_HOST, PING_PATH, REQUEST_TIMEOUT};
