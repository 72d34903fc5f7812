//! Handle to one running swarm node.

use std::fmt;

use flock_node_api::{OverlayError, OverlayNode, Transport};
use parking_lot::Mutex;

/// Lifecycle state of a node handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NodeState {
    /// Instantiated by the backend, not yet listening.
    Created,
    /// Listener bound and protocol tasks running.
    Started,
    /// Entered the overlay through the seed.
    Joined,
    /// A stop request is in flight.
    Stopping,
    /// Stopped; the listener has been released.
    Stopped,
}

/// Result of [`NodeHandle::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// This call stopped the node.
    Stopped,
    /// An earlier call already stopped (or is stopping) the node; the
    /// collaborator was not called again.
    AlreadyStopped,
}

/// An overlay node together with its position in the swarm.
///
/// Ordinal 0 is the seed. The handle guarantees the node's `stop` is reached at
/// most once, however many times [`stop`](Self::stop) is called.
pub struct NodeHandle<N> {
    ordinal: usize,
    transport: Transport,
    port: u16,
    state: Mutex<NodeState>,
    node: N,
}

impl<N: OverlayNode> NodeHandle<N> {
    /// Wrap a node that has been started.
    pub(crate) fn started(ordinal: usize, node: N) -> Self {
        Self {
            ordinal,
            transport: node.transport(),
            port: node.local_port(),
            state: Mutex::new(NodeState::Started),
            node,
        }
    }

    /// Record a successful join.
    pub(crate) fn mark_joined(&self) {
        let mut state = self.state.lock();
        if *state == NodeState::Started {
            *state = NodeState::Joined;
        }
    }

    /// Stop the node.
    ///
    /// Only the first call reaches the node; the handle ends in
    /// [`NodeState::Stopped`] whether or not the node reported an error.
    pub async fn stop(&self) -> Result<StopOutcome, OverlayError> {
        {
            let mut state = self.state.lock();
            if matches!(*state, NodeState::Stopping | NodeState::Stopped) {
                return Ok(StopOutcome::AlreadyStopped);
            }
            *state = NodeState::Stopping;
        }

        let res = self.node.stop().await;
        *self.state.lock() = NodeState::Stopped;
        res.map(|()| StopOutcome::Stopped)
    }
}

impl<N> NodeHandle<N> {
    /// Creation order; 0 is the seed.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Whether this handle is the seed node.
    pub fn is_seed(&self) -> bool {
        self.ordinal == 0
    }

    /// Transport the node listens on.
    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Loopback port the node listens on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Address other nodes use to join through this one.
    pub fn join_address(&self) -> String {
        join_address(self.port)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> NodeState {
        *self.state.lock()
    }

    /// The underlying overlay node.
    pub fn node(&self) -> &N {
        &self.node
    }
}

impl<N> fmt::Debug for NodeHandle<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("ordinal", &self.ordinal)
            .field("transport", &self.transport)
            .field("port", &self.port)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Loopback join target for a node listening on `port`.
pub fn join_address(port: u16) -> String {
    format!("127.0.0.1:{port}")
}

#[cfg(test)]
mod tests {
    use flock_swarm_test_utils::MockBackend;

    use super::*;
    use crate::NodeFactory;

    #[tokio::test]
    async fn test_stop_reaches_node_once() {
        let backend = MockBackend::new();
        let handle = NodeFactory::new(backend.clone())
            .create(0, Transport::Tcp, 23333)
            .await
            .unwrap();
        assert_eq!(handle.state(), NodeState::Started);

        assert_eq!(handle.stop().await.unwrap(), StopOutcome::Stopped);
        assert_eq!(handle.stop().await.unwrap(), StopOutcome::AlreadyStopped);
        assert_eq!(handle.state(), NodeState::Stopped);
        assert_eq!(backend.stop_count(23333), 1);
    }

    #[tokio::test]
    async fn test_failed_stop_still_ends_stopped() {
        let backend = MockBackend::new().fail_stop_on(4000);
        let handle = NodeFactory::new(backend.clone())
            .create(2, Transport::Kcp, 4000)
            .await
            .unwrap();

        assert!(handle.stop().await.is_err());
        assert_eq!(handle.state(), NodeState::Stopped);
        assert_eq!(handle.stop().await.unwrap(), StopOutcome::AlreadyStopped);
        assert_eq!(backend.stop_count(4000), 1);
    }

    #[tokio::test]
    async fn test_accessors() {
        let handle = NodeFactory::new(MockBackend::new())
            .create(0, Transport::Kcp, 23333)
            .await
            .unwrap();

        assert!(handle.is_seed());
        assert_eq!(handle.transport(), Transport::Kcp);
        assert_eq!(handle.join_address(), "127.0.0.1:23333");

        handle.mark_joined();
        assert_eq!(handle.state(), NodeState::Joined);
        assert_eq!(handle.state().to_string(), "joined");
    }
}
