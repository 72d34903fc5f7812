use std::{
    collections::{HashMap, HashSet},
    io,
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use flock_node_api::{NodeConfig, OverlayBackend, OverlayError, OverlayNode, Transport};
use parking_lot::Mutex;

/// One recorded collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create { port: u16, transport: Transport },
    Start { port: u16 },
    Join { port: u16, addr: String },
    /// A stop call was issued.
    Stop { port: u16 },
    /// A stop call returned, successfully or not.
    Stopped { port: u16 },
}

#[derive(Debug, Default)]
struct Script {
    fail_create: HashSet<u16>,
    fail_start: HashSet<u16>,
    fail_join: HashSet<u16>,
    fail_stop: HashSet<u16>,
    hang_stop: HashSet<u16>,
    stop_delay: HashMap<u16, Duration>,
}

#[derive(Debug, Default)]
struct Inner {
    script: Mutex<Script>,
    calls: Mutex<Vec<Call>>,
}

impl Inner {
    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

/// Scriptable in-memory backend. Clones share the script and the call log.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    inner: Arc<Inner>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creating a node on `port` fails.
    pub fn fail_create_on(self, port: u16) -> Self {
        self.inner.script.lock().fail_create.insert(port);
        self
    }

    /// Starting a node on `port` fails as if the port were taken.
    pub fn fail_start_on(self, port: u16) -> Self {
        self.inner.script.lock().fail_start.insert(port);
        self
    }

    /// The node on `port` cannot join.
    pub fn fail_join_on(self, port: u16) -> Self {
        self.inner.script.lock().fail_join.insert(port);
        self
    }

    /// Stopping the node on `port` returns an error.
    pub fn fail_stop_on(self, port: u16) -> Self {
        self.inner.script.lock().fail_stop.insert(port);
        self
    }

    /// Stopping the node on `port` never returns.
    pub fn hang_stop_on(self, port: u16) -> Self {
        self.inner.script.lock().hang_stop.insert(port);
        self
    }

    /// Stopping the node on `port` takes `delay`.
    pub fn delay_stop_on(self, port: u16, delay: Duration) -> Self {
        self.inner.script.lock().stop_delay.insert(port, delay);
        self
    }

    /// Every recorded call, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.inner.calls.lock().clone()
    }

    /// Ports of every create call, in order, including failed ones.
    pub fn created_ports(&self) -> Vec<u16> {
        self.filter(|call| match call {
            Call::Create { port, .. } => Some(*port),
            _ => None,
        })
    }

    /// `(port, addr)` of every join call, in order.
    pub fn joins(&self) -> Vec<(u16, String)> {
        self.filter(|call| match call {
            Call::Join { port, addr } => Some((*port, addr.clone())),
            _ => None,
        })
    }

    /// Ports in the order their stop calls were issued.
    pub fn stops(&self) -> Vec<u16> {
        self.filter(|call| match call {
            Call::Stop { port } => Some(*port),
            _ => None,
        })
    }

    /// Ports in the order their stop calls returned.
    pub fn stopped(&self) -> Vec<u16> {
        self.filter(|call| match call {
            Call::Stopped { port } => Some(*port),
            _ => None,
        })
    }

    /// Number of stop calls issued against `port`.
    pub fn stop_count(&self, port: u16) -> usize {
        self.stops().into_iter().filter(|p| *p == port).count()
    }

    fn filter<T>(&self, f: impl FnMut(&Call) -> Option<T>) -> Vec<T> {
        self.inner.calls.lock().iter().filter_map(f).collect()
    }
}

impl OverlayBackend for MockBackend {
    type Node = MockNode;

    fn new_node(&self, config: NodeConfig) -> Result<MockNode, OverlayError> {
        self.inner.record(Call::Create {
            port: config.port,
            transport: config.transport,
        });
        config.validate()?;
        if self.inner.script.lock().fail_create.contains(&config.port) {
            return Err(OverlayError::InvalidConfig(format!(
                "simulated create failure on port {}",
                config.port
            )));
        }
        Ok(MockNode {
            config,
            inner: Arc::clone(&self.inner),
        })
    }
}

/// Node produced by [`MockBackend`]. Holds no sockets.
#[derive(Debug)]
pub struct MockNode {
    config: NodeConfig,
    inner: Arc<Inner>,
}

impl MockNode {
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
}

#[async_trait]
impl OverlayNode for MockNode {
    async fn start(&self) -> Result<(), OverlayError> {
        let port = self.config.port;
        self.inner.record(Call::Start { port });
        if self.inner.script.lock().fail_start.contains(&port) {
            return Err(OverlayError::Bind {
                addr: SocketAddr::from((Ipv4Addr::LOCALHOST, port)),
                transport: self.config.transport,
                source: io::ErrorKind::AddrInUse.into(),
            });
        }
        Ok(())
    }

    async fn join(&self, addr: &str) -> Result<(), OverlayError> {
        let port = self.config.port;
        self.inner.record(Call::Join {
            port,
            addr: addr.to_string(),
        });
        if self.inner.script.lock().fail_join.contains(&port) {
            return Err(OverlayError::join(addr, "simulated join failure"));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), OverlayError> {
        let port = self.config.port;
        self.inner.record(Call::Stop { port });

        let (hang, delay, fail) = {
            let script = self.inner.script.lock();
            (
                script.hang_stop.contains(&port),
                script.stop_delay.get(&port).copied(),
                script.fail_stop.contains(&port),
            )
        };
        if hang {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.inner.record(Call::Stopped { port });
        if fail {
            return Err(OverlayError::Io(io::Error::other("simulated stop failure")));
        }
        Ok(())
    }

    fn local_port(&self) -> u16 {
        self.config.port
    }

    fn transport(&self) -> Transport {
        self.config.transport
    }
}
