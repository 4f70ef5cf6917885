use axum::http::{header, StatusCode};
use axum::routing::get;
use axum::Router;
use latency_exporter::api::create_api_server;
use latency_exporter::metrics::PeerMetrics;
use latency_exporter::network::{Peer, PeerClient, PeerClientSet, PeerTransport, ProbeError};
use latency_exporter::prober::{ProbeTiming, Prober};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::sleep;

/// Gap between probes, long enough for a finished connection to return to the pool
const SETTLE: Duration = Duration::from_millis(100);

fn settled_timing() -> ProbeTiming {
    ProbeTiming {
        warmup: Duration::ZERO,
        request_interval: SETTLE,
    }
}

/// Serve `router` on an ephemeral loopback port and return it as a peer
async fn spawn_peer(router: Router) -> Peer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Peer::new(addr.to_string())
}

fn pong_router() -> Router {
    Router::new().route("/ping", get(|| async { "pong" }))
}

/// Peer that closes the connection after every response
fn closing_router() -> Router {
    Router::new().route(
        "/ping",
        get(|| async { ([(header::CONNECTION, "close")], "pong") }),
    )
}

/// A loopback port with nothing listening on it
async fn refused_peer() -> Peer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Peer::new(addr.to_string())
}

/// Peer that promises a 100 byte body, sends two bytes and hangs up
async fn truncating_peer() -> Peer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\npo")
                .await
                .unwrap();
        }
    });
    Peer::new(addr.to_string())
}

fn series(output: &str, metric: &str, peer: &Peer) -> Option<String> {
    let prefix = format!("{}{{peer=\"{}\"}} ", metric, peer);
    output
        .lines()
        .find_map(|line| line.strip_prefix(&prefix).map(str::to_string))
}

#[tokio::test]
async fn test_keep_alive_reuses_connection() {
    let peer = spawn_peer(pong_router()).await;
    let client = PeerClient::new(peer.clone());

    let first = client.measure().await.expect("first probe should succeed");
    let first_addr = client.local_addr().expect("connection should be recorded");
    assert!(first > Duration::ZERO);

    for _ in 0..3 {
        sleep(SETTLE).await;
        client.measure().await.unwrap();
        assert_eq!(client.local_addr(), Some(first_addr));
    }
}

#[tokio::test]
async fn test_closed_connection_changes_local_addr() {
    let peer = spawn_peer(closing_router()).await;
    let client = PeerClient::new(peer.clone());

    client.measure().await.unwrap();
    let first_addr = client.local_addr().unwrap();

    sleep(SETTLE).await;
    client.measure().await.unwrap();
    let second_addr = client.local_addr().unwrap();

    assert_ne!(first_addr, second_addr);
}

#[tokio::test]
async fn test_unexpected_status() {
    let router = Router::new().route(
        "/ping",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
    );
    let peer = spawn_peer(router).await;
    let client = PeerClient::new(peer);

    let err = client.measure().await.unwrap_err();
    assert!(matches!(
        err,
        ProbeError::UnexpectedStatus(StatusCode::SERVICE_UNAVAILABLE)
    ));
    assert!(err.to_string().starts_with("unexpected response status"));
    // The connection itself was established
    assert!(client.local_addr().is_some());
}

#[tokio::test]
async fn test_connection_refused() {
    let client = PeerClient::new(refused_peer().await);

    let err = client.measure().await.unwrap_err();
    assert!(matches!(err, ProbeError::SendRequest(_)));
    assert!(err.to_string().starts_with("error sending request"));
    assert!(client.local_addr().is_none());
}

#[tokio::test]
async fn test_truncated_body() {
    let client = PeerClient::new(truncating_peer().await);

    let err = client.measure().await.unwrap_err();
    assert!(matches!(err, ProbeError::ReadBody(_)));
    assert!(err.to_string().starts_with("error reading body"));
    assert!(client.local_addr().is_some());
}

#[tokio::test]
async fn test_slow_peer_times_out() {
    let router = Router::new().route(
        "/ping",
        get(|| async {
            sleep(Duration::from_secs(5)).await;
            "pong"
        }),
    );
    let peer = spawn_peer(router).await;
    let client = PeerClient::new(peer).with_timeout(Duration::from_millis(200));

    let err = client.measure().await.unwrap_err();
    assert!(matches!(err, ProbeError::Timeout(_)));
}

#[tokio::test]
async fn test_prober_steady_peer_has_no_resets() {
    let peer = spawn_peer(pong_router()).await;
    let peers = vec![peer.clone()];
    let metrics = Arc::new(PeerMetrics::new().unwrap());
    let mut prober =
        Prober::new(PeerClientSet::new(&peers), metrics.clone(), peers).with_timing(settled_timing());

    for _ in 0..3 {
        prober.run_round().await;
    }

    let output = metrics.render();
    assert_eq!(
        series(&output, "latency_exporter_seconds_total_count", &peer).as_deref(),
        Some("3")
    );
    assert_eq!(
        series(&output, "latency_exporter_errors_total", &peer).as_deref(),
        Some("0")
    );
    assert_eq!(
        series(&output, "latency_exporter_connection_resets_total", &peer).as_deref(),
        Some("0")
    );
}

#[tokio::test]
async fn test_prober_counts_reconnections() {
    let peer = spawn_peer(closing_router()).await;
    let peers = vec![peer.clone()];
    let metrics = Arc::new(PeerMetrics::new().unwrap());
    let mut prober =
        Prober::new(PeerClientSet::new(&peers), metrics.clone(), peers).with_timing(settled_timing());

    for _ in 0..3 {
        prober.run_round().await;
    }

    // First round sets the baseline, every later round reconnects
    let output = metrics.render();
    assert_eq!(
        series(&output, "latency_exporter_connection_resets_total", &peer).as_deref(),
        Some("2")
    );
    assert_eq!(
        series(&output, "latency_exporter_errors_total", &peer).as_deref(),
        Some("0")
    );
}

#[tokio::test]
async fn test_prober_counts_truncated_body_as_error() {
    let peer = truncating_peer().await;
    let peers = vec![peer.clone()];
    let metrics = Arc::new(PeerMetrics::new().unwrap());
    let mut prober =
        Prober::new(PeerClientSet::new(&peers), metrics.clone(), peers).with_timing(settled_timing());

    prober.run_round().await;

    let output = metrics.render();
    assert_eq!(
        series(&output, "latency_exporter_errors_total", &peer).as_deref(),
        Some("1")
    );
    assert_eq!(
        series(&output, "latency_exporter_seconds_total_count", &peer).as_deref(),
        Some("0")
    );
    // The first connection only sets the baseline
    assert_eq!(
        series(&output, "latency_exporter_connection_resets_total", &peer).as_deref(),
        Some("0")
    );
}

#[tokio::test]
async fn test_prober_isolates_failing_peer() {
    let healthy = spawn_peer(pong_router()).await;
    let failing = refused_peer().await;
    let peers = vec![failing.clone(), healthy.clone()];
    let metrics = Arc::new(PeerMetrics::new().unwrap());
    let clients = PeerClientSet::new(&peers);
    let mut prober = Prober::new(clients, metrics.clone(), peers).with_timing(settled_timing());

    for round in 1..=3 {
        prober.run_round().await;

        let output = metrics.render();
        assert_eq!(
            series(&output, "latency_exporter_errors_total", &failing),
            Some(round.to_string())
        );
        assert_eq!(
            series(&output, "latency_exporter_connection_resets_total", &failing).as_deref(),
            Some("0")
        );
    }

    let output = metrics.render();
    assert_eq!(
        series(&output, "latency_exporter_errors_total", &healthy).as_deref(),
        Some("0")
    );
    assert_eq!(
        series(&output, "latency_exporter_seconds_total_count", &healthy).as_deref(),
        Some("3")
    );
    assert_eq!(
        series(&output, "latency_exporter_seconds_total_count", &failing).as_deref(),
        Some("0")
    );
    assert!(prober.transport().local_addr(&failing).is_none());
}

#[tokio::test]
async fn test_metrics_endpoint_serves_probe_results() {
    let peer = spawn_peer(pong_router()).await;
    let peers = vec![peer.clone()];
    let metrics = Arc::new(PeerMetrics::new().unwrap());
    let mut prober =
        Prober::new(PeerClientSet::new(&peers), metrics.clone(), peers).with_timing(settled_timing());
    prober.run_round().await;

    // Scrape through the real HTTP router
    let exporter = spawn_peer(create_api_server(metrics)).await;
    let scrape = PeerClient::new(exporter.clone());
    scrape.measure().await.expect("exporter should answer /ping");

    let mut stream = TcpStream::connect(exporter.as_str()).await.unwrap();
    stream
        .write_all(b"GET /metrics HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains(&format!(
        "latency_exporter_seconds_total_count{{peer=\"{}\"}} 1",
        peer
    )));
    assert!(response.contains(&format!(
        "latency_exporter_connection_resets_total{{peer=\"{}\"}} 0",
        peer
    )));
}
