//! Prometheus metrics exporter
//!
//! Serves the probe metrics over HTTP for Prometheus scraping.

use crate::metrics::recorder::PeerMetrics;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use std::sync::Arc;

/// Content type of the Prometheus text exposition format
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Errors that can occur during metrics setup
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Failed to setup metrics: {0}")]
    SetupFailed(String),
}

pub type MetricsResult<T> = Result<T, MetricsError>;

/// Axum route rendering every series held by [`PeerMetrics`]
pub fn metrics_route() -> axum::routing::MethodRouter<Arc<PeerMetrics>> {
    axum::routing::get(render_metrics)
}

async fn render_metrics(State(metrics): State<Arc<PeerMetrics>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        metrics.render(),
    )
}
