//! Interrupt-triggered concurrent teardown.

use std::{future::Future, sync::Arc, time::Duration};

use flock_node_api::{OverlayError, OverlayNode};
use flock_tasks::{CompletionBarrier, metrics::StopTaskMetrics};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{NodeHandle, StopOutcome, SwarmRegistry};

/// A node whose stop call returned an error.
#[derive(Debug)]
pub struct StopFailure {
    pub ordinal: usize,
    pub port: u16,
    pub error: OverlayError,
}

/// What happened to each node during shutdown.
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Number of stop tasks dispatched.
    pub dispatched: usize,
    /// Ports of nodes that stopped cleanly, in completion order.
    pub stopped: Vec<u16>,
    /// Nodes whose stop returned an error.
    pub failed: Vec<StopFailure>,
    /// Ports still stopping when the stop timeout elapsed.
    pub timed_out: Vec<u16>,
}

impl ShutdownReport {
    /// Every dispatched stop completed without error.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.timed_out.is_empty() && self.stopped.len() == self.dispatched
    }
}

#[derive(Default)]
struct Outcomes {
    stopped: Vec<u16>,
    failed: Vec<StopFailure>,
}

/// Stops every registered node once a trigger fires.
///
/// Stops are dispatched as independent tasks, last-registered first, and the
/// coordinator waits on a [`CompletionBarrier`] until each has finished. Without
/// a stop timeout a stop call that never returns blocks shutdown forever.
#[derive(Debug)]
pub struct ShutdownCoordinator<N> {
    nodes: Vec<Arc<NodeHandle<N>>>,
    stop_timeout: Option<Duration>,
    metrics: StopTaskMetrics,
}

impl<N: OverlayNode> ShutdownCoordinator<N> {
    /// Snapshot `registry` for shutdown.
    pub fn new(registry: &SwarmRegistry<N>) -> Self {
        Self {
            nodes: registry.snapshot(),
            stop_timeout: None,
            metrics: StopTaskMetrics::default(),
        }
    }

    /// Bound the wait for stop tasks. `None` waits forever.
    pub fn with_stop_timeout(mut self, stop_timeout: Option<Duration>) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }

    /// Wait for `trigger`, then stop every node.
    pub async fn run<F>(&self, trigger: F) -> ShutdownReport
    where
        F: Future<Output = ()>,
    {
        debug!(nodes = self.nodes.len(), "waiting for shutdown trigger");
        trigger.await;
        info!(nodes = self.nodes.len(), "shutting down swarm");
        self.stop_all().await
    }

    /// Dispatch one stop task per node in reverse registration order and wait
    /// for all of them.
    pub async fn stop_all(&self) -> ShutdownReport {
        let barrier = CompletionBarrier::new();
        let outcomes = Arc::new(Mutex::new(Outcomes::default()));

        for handle in self.nodes.iter().rev() {
            let guard = barrier.enter();
            let finished = self.metrics.spawned();
            let metrics = self.metrics.clone();
            let handle = Arc::clone(handle);
            let outcomes = Arc::clone(&outcomes);

            debug!(ordinal = handle.ordinal(), port = handle.port(), "dispatching stop");
            tokio::spawn(async move {
                let (ordinal, port) = (handle.ordinal(), handle.port());
                match handle.stop().await {
                    Ok(outcome) => {
                        if outcome == StopOutcome::AlreadyStopped {
                            debug!(ordinal, port, "node was already stopped");
                        } else {
                            info!(ordinal, port, "node stopped");
                        }
                        outcomes.lock().stopped.push(port);
                    }
                    Err(error) => {
                        metrics.failed();
                        warn!(ordinal, port, %error, "failed to stop node");
                        outcomes.lock().failed.push(StopFailure {
                            ordinal,
                            port,
                            error,
                        });
                    }
                }
                drop(finished);
                drop(guard);
            });
        }

        let elapsed = match self.stop_timeout {
            None => {
                barrier.wait().await;
                false
            }
            Some(limit) => tokio::time::timeout(limit, barrier.wait()).await.is_err(),
        };

        let Outcomes { stopped, failed } = std::mem::take(&mut *outcomes.lock());
        let timed_out = if elapsed {
            let pending: Vec<u16> = self
                .nodes
                .iter()
                .map(|h| h.port())
                .filter(|port| !stopped.contains(port) && !failed.iter().any(|f| f.port == *port))
                .collect();
            warn!(pending = ?pending, "stop timeout elapsed, abandoning remaining nodes");
            pending
        } else {
            Vec::new()
        };

        let report = ShutdownReport {
            dispatched: self.nodes.len(),
            stopped,
            failed,
            timed_out,
        };
        info!(
            stopped = report.stopped.len(),
            failed = report.failed.len(),
            timed_out = report.timed_out.len(),
            "swarm shut down"
        );
        report
    }
}
