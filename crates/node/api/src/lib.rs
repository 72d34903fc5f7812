//! Node API - the overlay collaborator as seen by the swarm orchestrator
//!
//! The orchestrator never inspects protocol state. It builds a [`NodeConfig`],
//! asks an [`OverlayBackend`] for a node, and drives that node only through the
//! four lifecycle calls on [`OverlayNode`]:
//!
//! ```text
//! OverlayBackend::new_node(config) ──► OverlayNode
//!                                        ├── start()
//!                                        ├── join("127.0.0.1:<seed port>")
//!                                        └── stop()
//! ```

mod config;
mod error;
mod node;
mod transport;

pub use config::*;
pub use error::OverlayError;
pub use node::*;
pub use transport::Transport;

pub use async_trait::async_trait;
