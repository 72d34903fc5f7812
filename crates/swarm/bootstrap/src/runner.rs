//! Whole-run driver: bootstrap, wait, shut down.

use std::{future::Future, time::Duration};

use flock_node_api::OverlayBackend;
use tokio::sync::watch;
use tracing::{error, info};

use crate::{
    BootstrapError, Bootstrapper, FixedDelay, JoinDelay, ShutdownCoordinator, ShutdownReport,
};

/// Phase of a swarm run.
///
/// `Idle -> Bootstrapping -> (Aborted | Running) -> ShuttingDown -> Exited`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum SwarmPhase {
    #[default]
    Idle,
    Bootstrapping,
    /// The seed exists; entered however many peers joined.
    Running,
    ShuttingDown,
    Exited,
    /// Bootstrap failed before the seed was up.
    Aborted,
}

/// Drives one bootstrap-then-shutdown run, publishing each [`SwarmPhase`].
#[derive(Debug)]
pub struct SwarmRunner<B, D = FixedDelay> {
    bootstrapper: Bootstrapper<B, D>,
    stop_timeout: Option<Duration>,
    phase: watch::Sender<SwarmPhase>,
}

impl<B: OverlayBackend, D: JoinDelay> SwarmRunner<B, D> {
    pub fn new(bootstrapper: Bootstrapper<B, D>) -> Self {
        Self {
            bootstrapper,
            stop_timeout: None,
            phase: watch::Sender::new(SwarmPhase::Idle),
        }
    }

    /// Bound how long shutdown waits for stop tasks.
    pub fn with_stop_timeout(mut self, stop_timeout: Option<Duration>) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }

    /// Receiver observing phase changes.
    pub fn subscribe(&self) -> watch::Receiver<SwarmPhase> {
        self.phase.subscribe()
    }

    /// Current phase.
    pub fn phase(&self) -> SwarmPhase {
        *self.phase.borrow()
    }

    /// Bootstrap the swarm, wait for `trigger`, then stop every node.
    pub async fn run<F>(&self, trigger: F) -> Result<ShutdownReport, BootstrapError>
    where
        F: Future<Output = ()>,
    {
        self.set_phase(SwarmPhase::Bootstrapping);
        let registry = match self.bootstrapper.run().await {
            Ok(registry) => registry,
            Err(e) => {
                error!(error = %e, "bootstrap aborted");
                self.set_phase(SwarmPhase::Aborted);
                return Err(e);
            }
        };
        self.set_phase(SwarmPhase::Running);
        info!(nodes = registry.len(), ports = ?registry.ports(), "swarm running");

        let coordinator = ShutdownCoordinator::new(&registry).with_stop_timeout(self.stop_timeout);
        let report = coordinator
            .run(async move {
                trigger.await;
                self.set_phase(SwarmPhase::ShuttingDown);
            })
            .await;

        self.set_phase(SwarmPhase::Exited);
        Ok(report)
    }

    fn set_phase(&self, phase: SwarmPhase) {
        self.phase.send_replace(phase);
    }
}
