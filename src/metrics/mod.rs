//! Metrics and observability module
//!
//! Prometheus-compatible metrics describing the health of each peer path.
//!
//! Key metrics exposed, all labeled by `peer`:
//! - Probe round-trip latency (histogram)
//! - Failed probes
//! - Connection resets inferred from local address changes

pub mod exporter;
pub mod recorder;

pub use exporter::{metrics_route, MetricsError, MetricsResult, EXPOSITION_CONTENT_TYPE};
pub use recorder::{
    MetricsSink, PeerMetrics, DURATION_BUCKETS, DURATION_METRIC, ERRORS_METRIC, PEER_LABEL,
    RESETS_METRIC,
};
