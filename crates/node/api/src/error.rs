//! Overlay node errors.

use std::{io, net::SocketAddr};

use crate::Transport;

/// Errors surfaced by an overlay node or backend.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    /// The node configuration was rejected.
    #[error("invalid node configuration: {0}")]
    InvalidConfig(String),

    /// The transport listener could not be bound.
    #[error("failed to bind {transport} listener on {addr}")]
    Bind {
        addr: SocketAddr,
        transport: Transport,
        #[source]
        source: io::Error,
    },

    /// A join target could not be parsed as `host:port`.
    #[error("invalid peer address {addr:?}: {reason}")]
    InvalidAddress { addr: String, reason: String },

    /// The join handshake with an existing node failed.
    #[error("join via {addr} failed: {reason}")]
    Join { addr: String, reason: String },

    /// `start` was called on a node that is already running.
    #[error("node already started")]
    AlreadyStarted,

    /// The operation requires a started node.
    #[error("node is not running")]
    NotRunning,

    /// Transport I/O error.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl OverlayError {
    /// Create a join error for the given target.
    pub fn join(addr: impl Into<String>, reason: impl ToString) -> Self {
        Self::Join {
            addr: addr.into(),
            reason: reason.to_string(),
        }
    }
}
