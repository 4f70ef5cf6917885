//! Peer latency exporter
//!
//! Periodically probes a static set of peers over HTTP, records round-trip
//! latency, failures and silent TCP reconnections, and exposes them as
//! Prometheus metrics.

pub mod api;
pub mod config;
pub mod metrics;
pub mod network;
pub mod prober;
pub mod telemetry;
