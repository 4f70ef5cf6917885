use crate::metrics::MetricsSink;
use crate::network::{Peer, PeerTransport};
use crate::prober::detector::{AddressChange, ResetDetector};
use crate::prober::types::ProbeTiming;
use tracing::{debug, error, info};

/// Probes every peer in a fixed order, forever.
///
/// Each probe feeds three series: latency on success, an error count on
/// failure, and a reset count whenever the local address of the peer's
/// connection differs from the one seen on the previous probe.
pub struct Prober<T, S> {
    transport: T,
    sink: S,
    peers: Vec<Peer>,
    timing: ProbeTiming,
    detector: ResetDetector,
}

impl<T: PeerTransport, S: MetricsSink> Prober<T, S> {
    /// Create a prober; every peer's series are initialized on `sink` right away
    pub fn new(transport: T, sink: S, peers: Vec<Peer>) -> Self {
        for peer in &peers {
            sink.initialize(peer);
        }

        Self {
            transport,
            sink,
            peers,
            timing: ProbeTiming::default(),
            detector: ResetDetector::new(),
        }
    }

    pub fn with_timing(mut self, timing: ProbeTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn detector(&self) -> &ResetDetector {
        &self.detector
    }

    /// Wait for the warm-up delay, then run rounds until the task is dropped
    pub async fn run(&mut self) {
        info!(
            peers = self.peers.len(),
            "Starting prober in {:?}", self.timing.warmup
        );
        tokio::time::sleep(self.timing.warmup).await;

        loop {
            self.run_round().await;
        }
    }

    /// Probe each peer once, pausing after every probe
    pub async fn run_round(&mut self) {
        for index in 0..self.peers.len() {
            let peer = self.peers[index].clone();
            self.probe_peer(&peer).await;
            tokio::time::sleep(self.timing.request_interval).await;
        }
    }

    /// Measure one peer and update its series
    pub async fn probe_peer(&mut self, peer: &Peer) {
        let result = self.transport.measure(peer).await;

        match &result {
            Ok(elapsed) => {
                debug!(peer = %peer, "Probe took {:?}", elapsed);
                self.sink.observe_duration(peer, elapsed.as_secs_f64());
            }
            Err(e) => {
                error!(peer = %peer, "error during measurement: {}", e);
                self.sink.increment_error(peer);
            }
        }

        if matches!(&result, Err(e) if !e.attempted_connection()) {
            return;
        }

        // No connection has ever succeeded: nothing to compare yet.
        let Some(current) = self.transport.local_addr(peer) else {
            debug!(peer = %peer, "No local address recorded yet");
            return;
        };

        match self.detector.observe(peer, current) {
            AddressChange::Baseline => {
                debug!(peer = %peer, local_addr = %current, "Recorded baseline local address");
            }
            AddressChange::Unchanged => {}
            AddressChange::Changed { previous, current } => {
                info!(
                    peer = %peer,
                    "Connection reset detected: {} -> {}", previous, current
                );
                self.sink.increment_reset(peer);
            }
        }
    }
}
