//! Timed probe loop
//!
//! Sequentially measures every configured peer, paced by fixed delays, and
//! turns local address changes into connection-reset counts.

mod detector;
mod prober;
mod types;

pub use detector::{AddressChange, ResetDetector};
pub use prober::Prober;
pub use types::{ProbeTiming, REQUEST_INTERVAL, WARMUP_DELAY};
