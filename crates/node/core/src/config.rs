//! Figment-based configuration loading.
//!
//! Configuration priority (highest wins):
//! 1. CLI arguments (applied after Figment load)
//! 2. Config file (TOML)
//! 3. Environment variables (`FLOCK_` prefix, `__` between sections)
//! 4. Defaults

use std::{path::Path, time::Duration};

use eyre::{Result, WrapErr};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use flock_node_api::{DEFAULT_BASE_STABILIZE_INTERVAL, Transport};
use flock_swarm_bootstrap::{
    BootstrapConfig, DEFAULT_BASE_PORT, DEFAULT_JOIN_DELAY, DEFAULT_NODES, FixedDelay,
};
use serde::{Deserialize, Serialize};

use crate::args::SwarmArgs;

/// Complete swarm configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Number of nodes, seed included.
    pub nodes: i64,

    /// Transport every node listens on.
    pub transport: Transport,

    /// Port of the seed node.
    pub base_port: u16,

    /// Base stabilization interval handed to every node.
    pub stabilize_interval_ms: u64,

    /// Join pacing.
    pub join: JoinConfig,

    /// Shutdown bounds.
    pub shutdown: ShutdownConfig,
}

/// Join pacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinConfig {
    /// Pause before each non-seed attempt, in microseconds.
    pub delay_us: u64,
}

/// Shutdown bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Seconds to wait for nodes to stop. Unset waits forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            nodes: DEFAULT_NODES,
            transport: Transport::default(),
            base_port: DEFAULT_BASE_PORT,
            stabilize_interval_ms: u64::try_from(DEFAULT_BASE_STABILIZE_INTERVAL.as_millis())
                .unwrap_or(u64::MAX),
            join: JoinConfig::default(),
            shutdown: ShutdownConfig::default(),
        }
    }
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            delay_us: u64::try_from(DEFAULT_JOIN_DELAY.as_micros()).unwrap_or(u64::MAX),
        }
    }
}

impl SwarmConfig {
    /// Load configuration from defaults, environment, and config file.
    /// CLI overrides should be applied separately after loading.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::figment(config_path)
            .extract()
            .wrap_err("Failed to load configuration")
    }

    fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Env::prefixed("FLOCK_").split("__"));

        if let Some(path) = config_path
            && path.exists()
        {
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    /// Override loaded values with flags given on the command line.
    pub fn apply_args(&mut self, args: &SwarmArgs) {
        if let Some(nodes) = args.nodes {
            self.nodes = nodes;
        }
        if let Some(transport) = args.transport {
            self.transport = transport;
        }
        if let Some(base_port) = args.base_port {
            self.base_port = base_port;
        }
        if let Some(delay_us) = args.join_delay_us {
            self.join.delay_us = delay_us;
        }
        if let Some(interval) = args.stabilize_interval_ms {
            self.stabilize_interval_ms = interval;
        }
        if args.shutdown_timeout_secs.is_some() {
            self.shutdown.timeout_secs = args.shutdown_timeout_secs;
        }
    }

    /// Parameters for the bootstrap driver.
    pub fn bootstrap_config(&self) -> BootstrapConfig {
        BootstrapConfig::new(self.nodes, self.transport)
            .with_base_port(self.base_port)
            .with_delay(FixedDelay(Duration::from_micros(self.join.delay_us)))
    }

    /// Base stabilization interval for every node.
    pub fn base_stabilize_interval(&self) -> Duration {
        Duration::from_millis(self.stabilize_interval_ms)
    }

    /// How long shutdown waits for nodes to stop, if bounded.
    pub fn stop_timeout(&self) -> Option<Duration> {
        self.shutdown.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = SwarmConfig::default();
        assert_eq!(config.nodes, 10);
        assert_eq!(config.transport, Transport::Tcp);
        assert_eq!(config.base_port, 23333);
        assert_eq!(config.stabilize_interval_ms, 233);
        assert_eq!(config.join.delay_us, 112_358);
        assert_eq!(config.stop_timeout(), None);
        assert_eq!(config.bootstrap_config(), BootstrapConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("flock.toml");

        fs::write(
            &config_path,
            r#"
nodes = 4
transport = "kcp"

[join]
delay_us = 500

[shutdown]
timeout_secs = 10
"#,
        )
        .unwrap();

        let config = SwarmConfig::figment(Some(&config_path))
            .extract::<SwarmConfig>()
            .unwrap();
        assert_eq!(config.nodes, 4);
        assert_eq!(config.transport, Transport::Kcp);
        assert_eq!(config.base_port, 23333);
        assert_eq!(config.join.delay_us, 500);
        assert_eq!(config.stop_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = SwarmConfig::figment(Some(&config_path))
            .extract::<SwarmConfig>()
            .unwrap();
        assert_eq!(config, SwarmConfig::default());
    }

    #[test]
    fn test_invalid_transport_in_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("flock.toml");
        fs::write(&config_path, "transport = \"quic\"\n").unwrap();

        assert!(SwarmConfig::load(Some(&config_path)).is_err());
    }

    #[test]
    fn test_cli_overrides_only_given_flags() {
        let mut config = SwarmConfig {
            nodes: 4,
            base_port: 30000,
            ..Default::default()
        };
        config.apply_args(&SwarmArgs {
            nodes: Some(2),
            transport: Some(Transport::Kcp),
            shutdown_timeout_secs: Some(1),
            ..Default::default()
        });

        assert_eq!(config.nodes, 2);
        assert_eq!(config.transport, Transport::Kcp);
        assert_eq!(config.base_port, 30000);
        assert_eq!(config.join.delay_us, 112_358);
        assert_eq!(config.stop_timeout(), Some(Duration::from_secs(1)));

        let bootstrap = config.bootstrap_config();
        assert_eq!(bootstrap.nodes, 2);
        assert_eq!(bootstrap.base_port, 30000);
        assert_eq!(bootstrap.delay, FixedDelay::default());
    }
}
