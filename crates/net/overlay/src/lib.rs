//! Loopback overlay collaborator.
//!
//! [`LoopbackBackend`] builds [`LoopbackNode`]s that listen on `127.0.0.1` and
//! enter an overlay by exchanging a JOIN/ACK handshake with an existing node.
//! Two transports are supported:
//!
//! - `tcp`: one TCP connection per handshake
//! - `kcp`: JOIN/ACK datagrams over UDP with retransmission
//!
//! Each node learns the listen address of every node it joins and of every node
//! that joins it. Nothing beyond that is maintained; there is no routing table.

mod backend;
mod frame;
mod kcp;
mod node;
mod peers;
mod tcp;

use std::time::Duration;

pub use backend::LoopbackBackend;
pub use frame::{Frame, FrameError};
pub use node::LoopbackNode;
pub use peers::PeerTable;

/// Upper bound on a single join handshake, including retransmissions.
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(3);

/// Interval between JOIN retransmissions on the datagram transport.
pub const KCP_RETRANSMIT_INTERVAL: Duration = Duration::from_millis(200);

/// JOIN transmissions attempted on the datagram transport before giving up.
pub const KCP_MAX_ATTEMPTS: u32 = 5;
