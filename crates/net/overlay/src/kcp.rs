//! Reliable datagram transport: join requests over UDP with retransmission.
//!
//! The joiner sends from an ephemeral socket and retransmits the JOIN frame
//! until an ACK arrives or the attempt budget is spent. Responders treat
//! duplicate JOINs idempotently, so a lost ACK only costs one retransmission.

use std::{
    io::ErrorKind,
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};

use flock_node_api::OverlayError;
use flock_tasks::Shutdown;
use tokio::net::UdpSocket;
use tracing::{debug, trace, warn};

use crate::{
    JOIN_TIMEOUT, KCP_MAX_ATTEMPTS, KCP_RETRANSMIT_INTERVAL,
    frame::{Frame, MAX_FRAME_LEN},
    peers::PeerTable,
};

/// Receive buffer size; larger than any valid frame so oversized datagrams are
/// detected rather than silently truncated.
const RECV_BUFFER_LEN: usize = 64;

/// Answer join requests until `shutdown` fires.
pub(crate) async fn serve(socket: UdpSocket, peers: Arc<PeerTable>, mut shutdown: Shutdown) {
    let mut buf = [0u8; RECV_BUFFER_LEN];

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                trace!("kcp socket received shutdown signal");
                break;
            }

            res = socket.recv_from(&mut buf) => match res {
                Ok((len, remote)) => {
                    let datagram = buf.get(..len).unwrap_or_default();
                    match Frame::decode(datagram) {
                        Ok(Frame::Join { port }) => {
                            let peer = SocketAddr::new(remote.ip(), port);
                            if peers.insert(peer) {
                                debug!(%peer, "peer joined");
                            }
                            let ack = Frame::Ack { peers: peers.wire_count() }.encode();
                            if let Err(e) = socket.send_to(&ack, remote).await {
                                warn!(%remote, error = %e, "failed to send ack");
                            }
                        }
                        Ok(Frame::Ack { .. }) => debug!(%remote, "unexpected ack on listener"),
                        Err(e) => debug!(%remote, error = %e, "dropping malformed datagram"),
                    }
                }
                Err(e) => debug!(error = %e, "datagram receive failed"),
            }
        }
    }
}

/// Perform a join handshake against `target`, returning its known peer count.
pub(crate) async fn join(target: SocketAddr, local_port: u16) -> Result<u32, OverlayError> {
    tokio::time::timeout(JOIN_TIMEOUT, handshake(target, local_port))
        .await
        .map_err(|_| OverlayError::join(target.to_string(), "handshake timed out"))?
}

async fn handshake(target: SocketAddr, local_port: u16) -> Result<u32, OverlayError> {
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await?;
    socket.connect(target).await?;

    let request = Frame::Join { port: local_port }.encode();
    let mut buf = [0u8; MAX_FRAME_LEN];

    for attempt in 1..=KCP_MAX_ATTEMPTS {
        socket
            .send(&request)
            .await
            .map_err(|e| classify(target, e))?;

        match tokio::time::timeout(KCP_RETRANSMIT_INTERVAL, socket.recv(&mut buf)).await {
            Ok(Ok(len)) => match Frame::decode(buf.get(..len).unwrap_or_default()) {
                Ok(Frame::Ack { peers }) => return Ok(peers),
                Ok(other) => debug!(%target, ?other, "ignoring unexpected reply"),
                Err(e) => debug!(%target, error = %e, "ignoring malformed reply"),
            },
            Ok(Err(e)) => return Err(classify(target, e)),
            Err(_) => trace!(%target, attempt, "no ack yet, retransmitting join"),
        }
    }

    Err(OverlayError::join(
        target.to_string(),
        format!("no ack after {KCP_MAX_ATTEMPTS} attempts"),
    ))
}

/// Connected UDP sockets surface ICMP port-unreachable as `ConnectionRefused`:
/// nothing is listening at the target, which is a join failure rather than a
/// local I/O fault.
fn classify(target: SocketAddr, e: std::io::Error) -> OverlayError {
    if e.kind() == ErrorKind::ConnectionRefused {
        OverlayError::join(target.to_string(), e)
    } else {
        OverlayError::Io(e)
    }
}
