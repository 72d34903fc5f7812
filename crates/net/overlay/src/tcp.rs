//! Stream transport: one TCP connection per join handshake.

use std::{net::SocketAddr, sync::Arc};

use flock_node_api::OverlayError;
use flock_tasks::{CompletionBarrier, Shutdown};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, trace, warn};

use crate::{JOIN_TIMEOUT, frame::Frame, peers::PeerTable};

/// Accept join handshakes until `shutdown` fires.
///
/// Each connection runs in its own task registered on `barrier`, so waiting on
/// the barrier after shutdown also waits for in-flight handshakes.
pub(crate) async fn serve(
    listener: TcpListener,
    peers: Arc<PeerTable>,
    mut shutdown: Shutdown,
    barrier: CompletionBarrier,
) {
    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                trace!("tcp listener received shutdown signal");
                break;
            }

            res = listener.accept() => match res {
                Ok((stream, remote)) => {
                    let guard = barrier.enter();
                    let peers = Arc::clone(&peers);
                    let shutdown = shutdown.clone();
                    tokio::spawn(async move {
                        tokio::select! {
                            _ = shutdown => {}
                            res = tokio::time::timeout(JOIN_TIMEOUT, handle_connection(stream, remote, &peers)) => {
                                match res {
                                    Ok(Ok(())) => {}
                                    Ok(Err(e)) => debug!(%remote, error = %e, "join handshake failed"),
                                    Err(_) => debug!(%remote, "join handshake timed out"),
                                }
                            }
                        }
                        drop(guard);
                    });
                }
                Err(e) => warn!(error = %e, "failed to accept connection"),
            }
        }
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    remote: SocketAddr,
    peers: &PeerTable,
) -> std::io::Result<()> {
    match Frame::read_from(&mut stream).await? {
        Frame::Join { port } => {
            let peer = SocketAddr::new(remote.ip(), port);
            if peers.insert(peer) {
                debug!(%peer, "peer joined");
            }
            Frame::Ack {
                peers: peers.wire_count(),
            }
            .write_to(&mut stream)
            .await
        }
        Frame::Ack { .. } => {
            debug!(%remote, "unexpected ack on listener");
            Ok(())
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
    let mut stream = TcpStream::connect(target)
        .await
        .map_err(|e| OverlayError::join(target.to_string(), e))?;
    Frame::Join { port: local_port }
        .write_to(&mut stream)
        .await
        .map_err(|e| OverlayError::join(target.to_string(), e))?;
    match Frame::read_from(&mut stream).await {
        Ok(Frame::Ack { peers }) => Ok(peers),
        Ok(other) => Err(OverlayError::join(
            target.to_string(),
            format!("unexpected reply {other:?}"),
        )),
        Err(e) => Err(OverlayError::join(target.to_string(), e)),
    }
}
