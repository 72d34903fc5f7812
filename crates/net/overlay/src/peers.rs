//! Known peer table shared between a node's tasks.

use std::{collections::BTreeSet, net::SocketAddr};

use parking_lot::RwLock;

/// Set of peer listen addresses a node has learned about.
#[derive(Debug, Default)]
pub struct PeerTable {
    peers: RwLock<BTreeSet<SocketAddr>>,
}

impl PeerTable {
    /// Record a peer. Returns `true` if it was not known before.
    pub fn insert(&self, addr: SocketAddr) -> bool {
        self.peers.write().insert(addr)
    }

    /// Number of known peers.
    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    /// Whether no peers are known.
    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }

    /// Whether `addr` is a known peer.
    pub fn contains(&self, addr: &SocketAddr) -> bool {
        self.peers.read().contains(addr)
    }

    /// Known peers in address order.
    pub fn snapshot(&self) -> Vec<SocketAddr> {
        self.peers.read().iter().copied().collect()
    }

    /// Known peer count as carried in an ACK frame.
    pub(crate) fn wire_count(&self) -> u32 {
        u32::try_from(self.len()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_deduplicates() {
        let table = PeerTable::default();
        let addr: SocketAddr = "127.0.0.1:23333".parse().unwrap();

        assert!(table.is_empty());
        assert!(table.insert(addr));
        assert!(!table.insert(addr));
        assert_eq!(table.len(), 1);
        assert!(table.contains(&addr));
        assert_eq!(table.wire_count(), 1);
    }

    #[test]
    fn test_snapshot_is_ordered() {
        let table = PeerTable::default();
        table.insert("127.0.0.1:23335".parse().unwrap());
        table.insert("127.0.0.1:23334".parse().unwrap());

        let ports: Vec<u16> = table.snapshot().iter().map(SocketAddr::port).collect();
        assert_eq!(ports, vec![23334, 23335]);
    }
}
