//! Per-node configuration handed to an [`OverlayBackend`](crate::OverlayBackend).

use std::time::Duration;

use crate::{OverlayError, Transport};

/// Base stabilization interval used by the overlay's maintenance loop.
pub const DEFAULT_BASE_STABILIZE_INTERVAL: Duration = Duration::from_millis(233);

/// Configuration for a single overlay node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeConfig {
    /// Loopback port to listen on. `0` lets the operating system pick one.
    pub port: u16,
    /// Transport to listen and dial with.
    pub transport: Transport,
    /// Base interval of the overlay's stabilization loop.
    pub base_stabilize_interval: Duration,
}

impl NodeConfig {
    /// Create a configuration with the default stabilization interval.
    pub fn new(transport: Transport, port: u16) -> Self {
        Self {
            port,
            transport,
            base_stabilize_interval: DEFAULT_BASE_STABILIZE_INTERVAL,
        }
    }

    /// Override the base stabilization interval.
    pub fn with_base_stabilize_interval(mut self, interval: Duration) -> Self {
        self.base_stabilize_interval = interval;
        self
    }

    /// Reject configurations the overlay cannot run with.
    pub fn validate(&self) -> Result<(), OverlayError> {
        if self.base_stabilize_interval.is_zero() {
            return Err(OverlayError::InvalidConfig(
                "base stabilize interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
