//! Flock CLI entry point.

use std::path::PathBuf;

use clap::Parser;
use eyre::Result;
use flock_net_overlay::LoopbackBackend;
use flock_node_core::{
    args::{LogArgs, SwarmArgs},
    config::SwarmConfig,
    logging, version,
};
use flock_swarm_bootstrap::{Bootstrapper, NodeFactory, SwarmRunner};
use tracing::{debug, error, info, warn};

/// Flock - start a local swarm of overlay nodes and stop it on Ctrl+C
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Logging configuration.
    #[command(flatten)]
    pub(crate) logs: LogArgs,

    /// Swarm configuration.
    #[command(flatten)]
    pub(crate) swarm: SwarmArgs,

    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
}

/// Parse arguments, run the swarm until interrupted, and tear it down.
///
/// Rejected swarm parameters and a failed seed are logged, not returned: the
/// process still exits successfully.
pub(crate) async fn run() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init_logging(&cli.logs)?;
    info!("Starting {}", version::NAME_VERSION);

    let mut config = SwarmConfig::load(cli.config.as_deref())?;
    config.apply_args(&cli.swarm);
    debug!(?config, "Loaded configuration");

    let factory = NodeFactory::new(LoopbackBackend)
        .with_base_stabilize_interval(config.base_stabilize_interval());
    let runner = SwarmRunner::new(Bootstrapper::new(config.bootstrap_config(), factory))
        .with_stop_timeout(config.stop_timeout());

    match runner.run(interrupt()).await {
        Ok(report) if report.is_clean() => info!(nodes = report.dispatched, "All nodes stopped"),
        Ok(report) => warn!(
            failed = report.failed.len(),
            timed_out = ?report.timed_out,
            "Shutdown finished with errors"
        ),
        // Already logged where it happened.
        Err(_) => {}
    }

    Ok(())
}

/// Resolves on the first Ctrl+C. Later interrupts are logged and otherwise ignored.
async fn interrupt() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => error!(error = %e, "Failed to listen for shutdown signal, shutting down"),
    }

    tokio::spawn(async {
        while tokio::signal::ctrl_c().await.is_ok() {
            warn!("Shutdown already in progress, ignoring interrupt");
        }
    });
}
