//! Per-peer probe metrics
//!
//! Records latency, error and reconnection metrics for each configured peer.

use crate::metrics::exporter::{MetricsError, MetricsResult};
use crate::network::Peer;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusRecorder};
use std::sync::Arc;

pub const DURATION_METRIC: &str = "latency_exporter_seconds_total";
pub const ERRORS_METRIC: &str = "latency_exporter_errors_total";
pub const RESETS_METRIC: &str = "latency_exporter_connection_resets_total";

/// Label carrying the peer's `host:port`
pub const PEER_LABEL: &str = "peer";

/// Latency histogram buckets, in seconds
pub const DURATION_BUCKETS: [f64; 10] = [0.005, 0.01, 0.015, 0.02, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0];

/// Where the prober reports its observations
pub trait MetricsSink: Send + Sync {
    /// Append one round-trip time to the peer's latency distribution
    fn observe_duration(&self, peer: &Peer, seconds: f64);

    fn increment_error(&self, peer: &Peer);

    fn increment_reset(&self, peer: &Peer);

    /// Make the peer's series exist (at zero) before anything is recorded
    fn initialize(&self, peer: &Peer);
}

impl<S: MetricsSink + ?Sized> MetricsSink for Arc<S> {
    fn observe_duration(&self, peer: &Peer, seconds: f64) {
        (**self).observe_duration(peer, seconds)
    }

    fn increment_error(&self, peer: &Peer) {
        (**self).increment_error(peer)
    }

    fn increment_reset(&self, peer: &Peer) {
        (**self).increment_reset(peer)
    }

    fn initialize(&self, peer: &Peer) {
        (**self).initialize(peer)
    }
}

/// Prometheus-backed sink.
///
/// Owns its own recorder instead of installing a global one, so several
/// instances can coexist (tests, embedding).
pub struct PeerMetrics {
    recorder: PrometheusRecorder,
}

impl PeerMetrics {
    pub fn new() -> MetricsResult<Self> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Full(DURATION_METRIC.to_string()), &DURATION_BUCKETS)
            .map_err(|e| MetricsError::SetupFailed(e.to_string()))?
            .build_recorder();

        metrics::with_local_recorder(&recorder, describe_metrics);

        Ok(Self { recorder })
    }

    /// Render all series in the Prometheus text format
    pub fn render(&self) -> String {
        self.recorder.handle().render()
    }

    fn record<T>(&self, f: impl FnOnce() -> T) -> T {
        metrics::with_local_recorder(&self.recorder, f)
    }
}

fn describe_metrics() {
    describe_histogram!(DURATION_METRIC, "Histogram of total duration.");
    describe_counter!(ERRORS_METRIC, "Number of total errors");
    describe_counter!(RESETS_METRIC, "Number of total connection resets");
}

impl MetricsSink for PeerMetrics {
    fn observe_duration(&self, peer: &Peer, seconds: f64) {
        self.record(|| {
            histogram!(DURATION_METRIC, PEER_LABEL => peer.to_string()).record(seconds)
        });
    }

    fn increment_error(&self, peer: &Peer) {
        self.record(|| counter!(ERRORS_METRIC, PEER_LABEL => peer.to_string()).increment(1));
    }

    fn increment_reset(&self, peer: &Peer) {
        self.record(|| counter!(RESETS_METRIC, PEER_LABEL => peer.to_string()).increment(1));
    }

    fn initialize(&self, peer: &Peer) {
        self.record(|| {
            counter!(ERRORS_METRIC, PEER_LABEL => peer.to_string()).increment(0);
            counter!(RESETS_METRIC, PEER_LABEL => peer.to_string()).increment(0);
            // Registration only; no sample is recorded.
            let _ = histogram!(DURATION_METRIC, PEER_LABEL => peer.to_string());
        });
    }
}
