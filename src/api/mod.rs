mod rest;

pub use rest::{RestApi, METRICS_PATH};

use crate::metrics::PeerMetrics;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Router serving `/ping` for peers and `/metrics` for scrapers
pub fn create_api_server(metrics: Arc<PeerMetrics>) -> Router {
    RestApi::new(metrics)
        .router()
        .layer(TraceLayer::new_for_http())
}
