//! Per-peer connection tracking
//!
//! Wraps the TCP connector used by a peer's HTTP client so that every new
//! physical connection publishes its local address. Requests that reuse an
//! idle pooled connection never reach the connector and leave the record as is.

use futures::future::BoxFuture;
use http::Uri;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioIo;
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::net::TcpStream;
use tower::Service;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Local address of the most recent physical connection to one peer
#[derive(Debug, Default)]
pub struct ConnectionRecord {
    local_addr: RwLock<Option<SocketAddr>>,
}

impl ConnectionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last recorded local address, `None` until a connection succeeds
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.read()
    }

    fn record(&self, addr: SocketAddr) {
        *self.local_addr.write() = Some(addr);
    }
}

/// Connector that records the local address of each connection it opens
#[derive(Clone)]
pub struct TrackingConnector {
    inner: HttpConnector,
    record: Arc<ConnectionRecord>,
}

impl TrackingConnector {
    pub fn new(record: Arc<ConnectionRecord>) -> Self {
        let mut inner = HttpConnector::new();
        inner.set_nodelay(true);

        Self { inner, record }
    }
}

impl Service<Uri> for TrackingConnector {
    type Response = TokioIo<TcpStream>;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, dst: Uri) -> Self::Future {
        let connecting = self.inner.call(dst);
        let record = self.record.clone();

        Box::pin(async move {
            // A failed dial leaves the previous address in place.
            let io = connecting.await?;

            match io.inner().local_addr() {
                Ok(addr) => {
                    tracing::debug!(local_addr = %addr, "opened new peer connection");
                    record.record(addr);
                }
                Err(e) => {
                    tracing::warn!("Connected but local address unavailable: {}", e);
                }
            }

            Ok::<_, BoxError>(io)
        })
    }
}
