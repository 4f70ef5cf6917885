use crate::network::error::{ProbeError, ProbeResult};
use crate::network::tracker::{ConnectionRecord, TrackingConnector};
use crate::network::types::{Peer, MAX_IDLE_PER_HOST, REQUEST_TIMEOUT};
use async_trait::async_trait;
use bytes::Bytes;
use http::{header, Method, Request, StatusCode};
use http_body_util::{BodyExt, Empty};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// What the prober needs from the network: a timed probe and the local
/// address of the connection it most recently opened for a peer.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Probe `peer` once and return the round-trip time
    async fn measure(&self, peer: &Peer) -> ProbeResult<Duration>;

    /// Local address of the latest physical connection to `peer`
    fn local_addr(&self, peer: &Peer) -> Option<SocketAddr>;
}

/// Persistent HTTP client pinned to a single peer
pub struct PeerClient {
    peer: Peer,
    client: Client<TrackingConnector, Empty<Bytes>>,
    record: Arc<ConnectionRecord>,
    timeout: Duration,
}

impl PeerClient {
    pub fn new(peer: Peer) -> Self {
        let record = Arc::new(ConnectionRecord::new());
        let connector = TrackingConnector::new(record.clone());

        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .pool_timer(TokioTimer::new())
            .build(connector);

        Self {
            peer,
            client,
            record,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Override the exchange timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn peer(&self) -> &Peer {
        &self.peer
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.record.local_addr()
    }

    /// Issue one `GET /ping` and time it until the body is fully drained
    pub async fn measure(&self) -> ProbeResult<Duration> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(self.peer.ping_url())
            .header(header::CONNECTION, "keep-alive")
            .body(Empty::<Bytes>::new())?;

        let started = Instant::now();
        match tokio::time::timeout(self.timeout, self.exchange(request)).await {
            Ok(result) => result.map(|()| started.elapsed()),
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        }
    }

    async fn exchange(&self, request: Request<Empty<Bytes>>) -> ProbeResult<()> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(ProbeError::SendRequest)?;

        if response.status() != StatusCode::OK {
            return Err(ProbeError::UnexpectedStatus(response.status()));
        }

        response
            .into_body()
            .collect()
            .await
            .map_err(ProbeError::ReadBody)?;

        Ok(())
    }
}

/// One [`PeerClient`] per configured peer
pub struct PeerClientSet {
    clients: HashMap<Peer, PeerClient>,
}

impl PeerClientSet {
    pub fn new(peers: &[Peer]) -> Self {
        let clients = peers
            .iter()
            .map(|peer| (peer.clone(), PeerClient::new(peer.clone())))
            .collect();

        Self { clients }
    }

    /// Apply the same exchange timeout to every client
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let clients = self
            .clients
            .into_iter()
            .map(|(peer, client)| (peer, client.with_timeout(timeout)))
            .collect();

        Self { clients }
    }

    pub fn get(&self, peer: &Peer) -> Option<&PeerClient> {
        self.clients.get(peer)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[async_trait]
impl PeerTransport for PeerClientSet {
    async fn measure(&self, peer: &Peer) -> ProbeResult<Duration> {
        match self.clients.get(peer) {
            Some(client) => client.measure().await,
            None => Err(ProbeError::UnknownPeer(peer.clone())),
        }
    }

    fn local_addr(&self, peer: &Peer) -> Option<SocketAddr> {
        self.clients.get(peer).and_then(PeerClient::local_addr)
    }
}
