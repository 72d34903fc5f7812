//! Node lifecycle traits.
//!
//! Defines the interface for creating, starting, joining and stopping nodes.

use async_trait::async_trait;

use crate::{NodeConfig, OverlayError, Transport};

/// A single overlay participant.
///
/// Implementations own their protocol machinery entirely; callers only drive
/// the lifecycle and observe success or failure.
#[async_trait]
pub trait OverlayNode: Send + Sync + 'static {
    /// Start the node.
    ///
    /// This should:
    /// - Bind the transport listener
    /// - Launch the node's internal protocol tasks
    async fn start(&self) -> Result<(), OverlayError>;

    /// Join the overlay through an existing node at `addr` (`host:port`).
    async fn join(&self, addr: &str) -> Result<(), OverlayError>;

    /// Stop the node.
    ///
    /// This should stop the node's internal tasks and release its listener.
    /// Stopping a node that never started is not an error; stopping one whose
    /// start is still in flight fails with [`OverlayError::NotRunning`].
    async fn stop(&self) -> Result<(), OverlayError>;

    /// Port the node listens on. Reflects the bound port once started.
    fn local_port(&self) -> u16;

    /// Transport the node was configured with.
    fn transport(&self) -> Transport;
}

/// Builds overlay nodes from configuration.
///
/// Nodes are created with no pre-known peers.
pub trait OverlayBackend: Send + Sync + 'static {
    /// Node type produced by this backend.
    type Node: OverlayNode;

    /// Instantiate a node. The returned node has not been started.
    fn new_node(&self, config: NodeConfig) -> Result<Self::Node, OverlayError>;
}
