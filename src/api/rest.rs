use crate::metrics::{metrics_route, PeerMetrics};
use crate::network::PING_PATH;
use axum::{routing::get, Router};
use std::sync::Arc;

pub const METRICS_PATH: &str = "/metrics";

pub struct RestApi {
    metrics: Arc<PeerMetrics>,
}

impl RestApi {
    pub fn new(metrics: Arc<PeerMetrics>) -> Self {
        Self { metrics }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(PING_PATH, get(ping))
            .route(METRICS_PATH, metrics_route())
            .with_state(self.metrics.clone())
    }
}

/// Health-check endpoint probed by other nodes
async fn ping() -> &'static str {
    "pong"
}
