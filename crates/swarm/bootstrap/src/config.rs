//! Bootstrap parameters.

use flock_node_api::Transport;

use crate::{DEFAULT_JOIN_DELAY, FixedDelay};

/// Port of the seed node; node `i` listens on `base + i`.
pub const DEFAULT_BASE_PORT: u16 = 23333;

/// Swarm size when none is requested.
pub const DEFAULT_NODES: i64 = 10;

/// Rejected bootstrap parameters. Nothing is created when these occur.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("swarm size must be at least 1, got {0}")]
    InvalidNodeCount(i64),
    #[error("base port must be non-zero")]
    ZeroBasePort,
    #[error("{nodes} nodes from base port {base_port} exceed the port range")]
    PortRangeOverflow { base_port: u16, nodes: i64 },
}

/// Parameters of one bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// Requested swarm size, seed included. Signed so that a nonsensical value
    /// coming from the command line is reported rather than wrapped.
    pub nodes: i64,
    pub transport: Transport,
    pub base_port: u16,
    pub delay: FixedDelay,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            nodes: DEFAULT_NODES,
            transport: Transport::default(),
            base_port: DEFAULT_BASE_PORT,
            delay: FixedDelay(DEFAULT_JOIN_DELAY),
        }
    }
}

impl BootstrapConfig {
    pub fn new(nodes: i64, transport: Transport) -> Self {
        Self {
            nodes,
            transport,
            ..Default::default()
        }
    }

    pub fn with_base_port(mut self, base_port: u16) -> Self {
        self.base_port = base_port;
        self
    }

    pub fn with_delay(mut self, delay: FixedDelay) -> Self {
        self.delay = delay;
        self
    }

    /// Validate the parameters, returning the swarm size.
    pub fn validate(&self) -> Result<usize, ConfigError> {
        if self.nodes < 1 {
            return Err(ConfigError::InvalidNodeCount(self.nodes));
        }
        if self.base_port == 0 {
            return Err(ConfigError::ZeroBasePort);
        }

        let overflow = ConfigError::PortRangeOverflow {
            base_port: self.base_port,
            nodes: self.nodes,
        };
        let last = u16::try_from(self.nodes - 1)
            .ok()
            .and_then(|offset| self.base_port.checked_add(offset));
        if last.is_none() {
            return Err(overflow);
        }
        usize::try_from(self.nodes).map_err(|_| overflow)
    }

    /// Port of the node at `ordinal`. Only meaningful after [`validate`](Self::validate).
    pub fn port_for(&self, ordinal: usize) -> Option<u16> {
        u16::try_from(ordinal)
            .ok()
            .and_then(|offset| self.base_port.checked_add(offset))
    }
}
