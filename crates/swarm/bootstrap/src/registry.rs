//! Ordered collection of the swarm's nodes.

use std::sync::Arc;

use crate::NodeHandle;

/// Rejected registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("port {0} is already registered")]
    DuplicatePort(u16),
    #[error("the first registered node must be the seed, got ordinal {0}")]
    SeedNotFirst(usize),
}

/// Append-only list of node handles in registration order.
///
/// Index 0, when present, is the seed. Ports are unique.
#[derive(Debug)]
pub struct SwarmRegistry<N> {
    nodes: Vec<Arc<NodeHandle<N>>>,
}

impl<N> Default for SwarmRegistry<N> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<N> SwarmRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handle.
    ///
    /// On rejection the handle is returned with the error so the caller can
    /// still stop it.
    #[allow(clippy::result_large_err)]
    pub fn register(
        &mut self,
        handle: NodeHandle<N>,
    ) -> Result<(), (RegistryError, NodeHandle<N>)> {
        if self.nodes.is_empty() && !handle.is_seed() {
            return Err((RegistryError::SeedNotFirst(handle.ordinal()), handle));
        }
        if self.nodes.iter().any(|h| h.port() == handle.port()) {
            return Err((RegistryError::DuplicatePort(handle.port()), handle));
        }
        self.nodes.push(Arc::new(handle));
        Ok(())
    }

    /// Shared references to every handle, in registration order.
    pub fn snapshot(&self) -> Vec<Arc<NodeHandle<N>>> {
        self.nodes.clone()
    }

    pub fn seed(&self) -> Option<&NodeHandle<N>> {
        self.nodes.first().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeHandle<N>> {
        self.nodes.iter().map(Arc::as_ref)
    }

    pub fn ports(&self) -> Vec<u16> {
        self.nodes.iter().map(|h| h.port()).collect()
    }
}
