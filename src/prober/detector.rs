//! Reconnection detection from local address changes

use crate::network::Peer;
use std::collections::HashMap;
use std::net::SocketAddr;

/// Result of comparing an observed local address with the last known one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressChange {
    /// First observation for the peer; stored, nothing to compare against
    Baseline,
    Unchanged,
    Changed {
        previous: SocketAddr,
        current: SocketAddr,
    },
}

/// Last-known local address per peer
#[derive(Debug, Default)]
pub struct ResetDetector {
    last_known: HashMap<Peer, SocketAddr>,
}

impl ResetDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `current` with the stored address for `peer` and remember it
    pub fn observe(&mut self, peer: &Peer, current: SocketAddr) -> AddressChange {
        match self.last_known.insert(peer.clone(), current) {
            None => AddressChange::Baseline,
            Some(previous) if previous == current => AddressChange::Unchanged,
            Some(previous) => AddressChange::Changed { previous, current },
        }
    }

    pub fn last_known(&self, peer: &Peer) -> Option<SocketAddr> {
        self.last_known.get(peer).copied()
    }
}
