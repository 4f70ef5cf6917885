//! Command-line configuration
//!
//! The peer list is the only tunable; intervals, timeouts, buckets and the
//! listen address are fixed.

use crate::network::Peer;
use clap::Parser;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;

pub const DEFAULT_PEERS: &str = "127.0.0.1:9080";

/// Address serving `/ping` and `/metrics`
pub const LISTEN_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 9080);

#[derive(Debug, Parser)]
#[command(name = "latency-exporter", version, about = "Measures HTTP latency to a set of peers")]
pub struct Args {
    /// Comma-separated peers to probe, as host:port
    #[arg(long, env = "PEERS", default_value = DEFAULT_PEERS)]
    pub peers: String,
}

impl Args {
    pub fn peer_list(&self) -> ConfigResult<Vec<Peer>> {
        parse_peers(&self.peers)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No peers configured")]
    NoPeers,

    #[error("Peer listed more than once: {0}")]
    DuplicatePeer(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Split a comma-separated peer list, keeping the configured order
pub fn parse_peers(list: &str) -> ConfigResult<Vec<Peer>> {
    let mut seen = HashSet::new();
    let mut peers = Vec::new();

    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        if !seen.insert(entry) {
            return Err(ConfigError::DuplicatePeer(entry.to_string()));
        }
        peers.push(Peer::new(entry));
    }

    if peers.is_empty() {
        return Err(ConfigError::NoPeers);
    }

    Ok(peers)
}
