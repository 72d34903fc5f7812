//! Backend producing loopback nodes.

use flock_node_api::{NodeConfig, OverlayBackend, OverlayError};

use crate::LoopbackNode;

/// [`OverlayBackend`] for [`LoopbackNode`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopbackBackend;

impl OverlayBackend for LoopbackBackend {
    type Node = LoopbackNode;

    fn new_node(&self, config: NodeConfig) -> Result<Self::Node, OverlayError> {
        config.validate()?;
        Ok(LoopbackNode::new(config))
    }
}
