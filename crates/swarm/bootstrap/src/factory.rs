//! Node factory: configuration plus start.

use std::time::Duration;

use flock_node_api::{
    DEFAULT_BASE_STABILIZE_INTERVAL, NodeConfig, OverlayBackend, OverlayError, OverlayNode,
    Transport,
};
use tracing::debug;

use crate::NodeHandle;

/// A node could not be instantiated or started.
#[derive(Debug, thiserror::Error)]
#[error("failed to create {transport} node on port {port}")]
pub struct CreateError {
    pub transport: Transport,
    pub port: u16,
    #[source]
    pub source: OverlayError,
}

/// Builds node configuration and produces running nodes.
///
/// No retry is attempted: bind failures and rejected configuration are both
/// reported as a single [`CreateError`].
#[derive(Debug, Clone)]
pub struct NodeFactory<B> {
    backend: B,
    base_stabilize_interval: Duration,
}

impl<B: OverlayBackend> NodeFactory<B> {
    /// Create a factory using the default base stabilization interval.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            base_stabilize_interval: DEFAULT_BASE_STABILIZE_INTERVAL,
        }
    }

    /// Override the base stabilization interval handed to every node.
    pub fn with_base_stabilize_interval(mut self, interval: Duration) -> Self {
        self.base_stabilize_interval = interval;
        self
    }

    /// The backend nodes are created with.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Configuration for a node listening on `port`.
    pub fn config_for(&self, transport: Transport, port: u16) -> NodeConfig {
        NodeConfig::new(transport, port).with_base_stabilize_interval(self.base_stabilize_interval)
    }

    /// Instantiate and start a node. The returned handle is in the `Started` state.
    pub async fn create(
        &self,
        ordinal: usize,
        transport: Transport,
        port: u16,
    ) -> Result<NodeHandle<B::Node>, CreateError> {
        let wrap = |source| CreateError {
            transport,
            port,
            source,
        };

        let node = self
            .backend
            .new_node(self.config_for(transport, port))
            .map_err(wrap)?;
        node.start().await.map_err(wrap)?;

        debug!(ordinal, port, %transport, "node started");
        Ok(NodeHandle::started(ordinal, node))
    }
}
