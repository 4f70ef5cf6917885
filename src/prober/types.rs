use std::time::Duration;

/// Delay before the first round, giving local services time to come up
pub const WARMUP_DELAY: Duration = Duration::from_secs(5);

/// Pause after every probe, bounding the request rate to each peer
pub const REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// Pacing of the probe loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTiming {
    pub warmup: Duration,
    pub request_interval: Duration,
}

impl Default for ProbeTiming {
    fn default() -> Self {
        Self {
            warmup: WARMUP_DELAY,
            request_interval: REQUEST_INTERVAL,
        }
    }
}

impl ProbeTiming {
    /// No delays at all; rounds run back to back
    pub fn immediate() -> Self {
        Self {
            warmup: Duration::ZERO,
            request_interval: Duration::ZERO,
        }
    }
}
