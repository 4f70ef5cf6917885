use crate::network::types::Peer;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single measurement attempt against a peer.
///
/// None of these are fatal; the prober counts them and moves on.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("error creating request: {0}")]
    CreateRequest(#[from] http::Error),

    #[error("error sending request: {0}")]
    SendRequest(#[source] hyper_util::client::legacy::Error),

    #[error("error sending request: timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected response status: {0}")]
    UnexpectedStatus(http::StatusCode),

    #[error("error reading body: {0}")]
    ReadBody(#[source] hyper::Error),

    #[error("no client configured for peer {0}")]
    UnknownPeer(Peer),
}

impl ProbeError {
    /// Whether the attempt got far enough to go through the peer's connector.
    ///
    /// Only then can the recorded local address be meaningful for this round.
    pub fn attempted_connection(&self) -> bool {
        !matches!(
            self,
            ProbeError::CreateRequest(_) | ProbeError::UnknownPeer(_)
        )
    }
}

pub type ProbeResult<T> = Result<T, ProbeError>;
