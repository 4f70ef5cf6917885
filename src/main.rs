use anyhow::{Context, Result};
use clap::Parser;
use latency_exporter::api::create_api_server;
use latency_exporter::config::{Args, LISTEN_ADDR};
use latency_exporter::metrics::PeerMetrics;
use latency_exporter::network::{Peer, PeerClientSet};
use latency_exporter::prober::Prober;
use latency_exporter::telemetry::init_tracing;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let peers = args.peer_list().context("Invalid peer list")?;
    let names: Vec<&str> = peers.iter().map(Peer::as_str).collect();
    tracing::info!("Probing {} peer(s): {}", peers.len(), names.join(","));

    let metrics = Arc::new(PeerMetrics::new().context("Failed to create metrics recorder")?);
    let clients = PeerClientSet::new(&peers);
    let mut prober = Prober::new(clients, metrics.clone(), peers);

    tokio::spawn(async move { prober.run().await });

    let app = create_api_server(metrics);
    let listener = tokio::net::TcpListener::bind(LISTEN_ADDR)
        .await
        .with_context(|| format!("Failed to bind to {}", LISTEN_ADDR))?;

    tracing::info!("Beginning to serve on {}", LISTEN_ADDR);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
