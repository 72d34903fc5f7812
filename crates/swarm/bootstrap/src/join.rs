//! Create-then-join of a single non-seed node.

use std::fmt;

use flock_node_api::{OverlayBackend, OverlayError, OverlayNode, Transport};
use tracing::debug;

use crate::{CreateError, NodeFactory, NodeHandle, handle::join_address};

/// Failure of a create-then-join attempt.
pub enum JoinError<N> {
    /// The node could not be created; no join was attempted.
    Create(CreateError),
    /// The node was created but could not join the seed. The running node is
    /// handed back so the caller decides what happens to it.
    Join {
        handle: NodeHandle<N>,
        seed_port: u16,
        source: OverlayError,
    },
}

impl<N> JoinError<N> {
    /// The created node, if creation got that far.
    pub fn into_handle(self) -> Option<NodeHandle<N>> {
        match self {
            Self::Create(_) => None,
            Self::Join { handle, .. } => Some(handle),
        }
    }
}

impl<N> fmt::Debug for JoinError<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create(e) => f.debug_tuple("Create").field(e).finish(),
            Self::Join {
                handle,
                seed_port,
                source,
            } => f
                .debug_struct("Join")
                .field("handle", handle)
                .field("seed_port", seed_port)
                .field("source", source)
                .finish(),
        }
    }
}

impl<N> fmt::Display for JoinError<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create(e) => e.fmt(f),
            Self::Join {
                handle, seed_port, ..
            } => write!(
                f,
                "node on port {} failed to join seed at {}",
                handle.port(),
                join_address(*seed_port)
            ),
        }
    }
}

impl<N> std::error::Error for JoinError<N> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Create(e) => Some(e),
            Self::Join { source, .. } => Some(source),
        }
    }
}

impl<N> From<CreateError> for JoinError<N> {
    fn from(e: CreateError) -> Self {
        Self::Create(e)
    }
}

/// Create a node on `local_port` and join it to the seed listening on `seed_port`.
///
/// A creation failure returns before any join is attempted.
pub async fn join<B: OverlayBackend>(
    factory: &NodeFactory<B>,
    ordinal: usize,
    transport: Transport,
    local_port: u16,
    seed_port: u16,
) -> Result<NodeHandle<B::Node>, JoinError<B::Node>> {
    let handle = factory.create(ordinal, transport, local_port).await?;

    let target = join_address(seed_port);
    if let Err(source) = handle.node().join(&target).await {
        return Err(JoinError::Join {
            handle,
            seed_port,
            source,
        });
    }

    handle.mark_joined();
    debug!(ordinal, port = handle.port(), %target, "node joined seed");
    Ok(handle)
}
