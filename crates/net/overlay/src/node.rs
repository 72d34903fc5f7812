//! Loopback overlay node.

use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::{
        Arc,
        atomic::{AtomicU16, Ordering},
    },
};

use async_trait::async_trait;
use flock_node_api::{NodeConfig, OverlayError, OverlayNode, Transport};
use flock_tasks::{CompletionBarrier, Shutdown, Signal, signal};
use parking_lot::Mutex;
use tokio::net::{TcpListener, UdpSocket};
use tracing::{debug, info, trace};

use crate::{kcp, peers::PeerTable, tcp};

/// Lifecycle of the node's internal tasks.
#[derive(Debug)]
enum Runtime {
    Idle,
    Starting,
    Running {
        signal: Signal,
        barrier: CompletionBarrier,
    },
    Stopped,
}

/// An overlay participant bound to a loopback port.
///
/// Runs two internal tasks once started: a listener answering join handshakes
/// and a stabilization loop ticking at the configured base interval.
#[derive(Debug)]
pub struct LoopbackNode {
    config: NodeConfig,
    bound_port: AtomicU16,
    peers: Arc<PeerTable>,
    runtime: Mutex<Runtime>,
}

impl LoopbackNode {
    /// Create an unstarted node.
    pub fn new(config: NodeConfig) -> Self {
        Self {
            config,
            bound_port: AtomicU16::new(config.port),
            peers: Arc::new(PeerTable::default()),
            runtime: Mutex::new(Runtime::Idle),
        }
    }

    /// The node's configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Peers this node has learned about, through joins in either direction.
    pub fn peers(&self) -> Vec<SocketAddr> {
        self.peers.snapshot()
    }

    /// Number of known peers.
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Whether the node's internal tasks are running.
    pub fn is_running(&self) -> bool {
        matches!(*self.runtime.lock(), Runtime::Running { .. })
    }

    fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, self.config.port))
    }

    fn bind_error(&self, source: std::io::Error) -> OverlayError {
        OverlayError::Bind {
            addr: self.listen_addr(),
            transport: self.config.transport,
            source,
        }
    }

    async fn spawn_listener(
        &self,
        shutdown: Shutdown,
        barrier: &CompletionBarrier,
    ) -> Result<SocketAddr, OverlayError> {
        let peers = Arc::clone(&self.peers);
        let guard = barrier.enter();

        match self.config.transport {
            Transport::Tcp => {
                let listener = TcpListener::bind(self.listen_addr())
                    .await
                    .map_err(|e| self.bind_error(e))?;
                let local = listener.local_addr()?;
                let barrier = barrier.clone();
                tokio::spawn(async move {
                    tcp::serve(listener, peers, shutdown, barrier).await;
                    drop(guard);
                });
                Ok(local)
            }
            Transport::Kcp => {
                let socket = UdpSocket::bind(self.listen_addr())
                    .await
                    .map_err(|e| self.bind_error(e))?;
                let local = socket.local_addr()?;
                tokio::spawn(async move {
                    kcp::serve(socket, peers, shutdown).await;
                    drop(guard);
                });
                Ok(local)
            }
        }
    }

    fn spawn_stabilizer(&self, mut shutdown: Shutdown, barrier: &CompletionBarrier) {
        let guard = barrier.enter();
        let peers = Arc::clone(&self.peers);
        let period = self.config.base_stabilize_interval;
        let port = self.local_port();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => break,
                    _ = interval.tick() => trace!(port, peers = peers.len(), "stabilize"),
                }
            }
            drop(guard);
        });
    }
}

#[async_trait]
impl OverlayNode for LoopbackNode {
    async fn start(&self) -> Result<(), OverlayError> {
        {
            let mut runtime = self.runtime.lock();
            if !matches!(*runtime, Runtime::Idle) {
                return Err(OverlayError::AlreadyStarted);
            }
            *runtime = Runtime::Starting;
        }

        let (signal, shutdown) = signal();
        let barrier = CompletionBarrier::new();

        let local = match self.spawn_listener(shutdown.clone(), &barrier).await {
            Ok(local) => local,
            Err(e) => {
                *self.runtime.lock() = Runtime::Idle;
                return Err(e);
            }
        };
        self.bound_port.store(local.port(), Ordering::Release);
        self.spawn_stabilizer(shutdown, &barrier);

        *self.runtime.lock() = Runtime::Running { signal, barrier };
        debug!(%local, transport = %self.config.transport, "overlay node started");
        Ok(())
    }

    async fn join(&self, addr: &str) -> Result<(), OverlayError> {
        if !self.is_running() {
            return Err(OverlayError::NotRunning);
        }

        let target: SocketAddr = addr.parse().map_err(|e: std::net::AddrParseError| {
            OverlayError::InvalidAddress {
                addr: addr.to_string(),
                reason: e.to_string(),
            }
        })?;

        let local_port = self.local_port();
        let remote_peers = match self.config.transport {
            Transport::Tcp => tcp::join(target, local_port).await?,
            Transport::Kcp => kcp::join(target, local_port).await?,
        };

        self.peers.insert(target);
        info!(port = local_port, %target, remote_peers, "joined overlay");
        Ok(())
    }

    async fn stop(&self) -> Result<(), OverlayError> {
        let running = {
            let mut runtime = self.runtime.lock();
            match std::mem::replace(&mut *runtime, Runtime::Stopped) {
                Runtime::Running { signal, barrier } => Some((signal, barrier)),
                // The start would go on to install a running runtime after us.
                Runtime::Starting => {
                    *runtime = Runtime::Starting;
                    return Err(OverlayError::NotRunning);
                }
                other => {
                    *runtime = other;
                    None
                }
            }
        };

        let Some((signal, barrier)) = running else {
            trace!(port = self.local_port(), "stop on inactive node");
            return Ok(());
        };

        signal.fire();
        barrier.wait().await;
        debug!(port = self.local_port(), "overlay node stopped");
        Ok(())
    }

    fn local_port(&self) -> u16 {
        self.bound_port.load(Ordering::Acquire)
    }

    fn transport(&self) -> Transport {
        self.config.transport
    }
}
