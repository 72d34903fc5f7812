//! Sequential swarm bootstrap.

use flock_node_api::OverlayBackend;
use tracing::{error, info, warn};

use crate::{
    BootstrapConfig, ConfigError, CreateError, FixedDelay, JoinDelay, JoinError, NodeFactory,
    NodeHandle, RegistryError, SwarmRegistry, join,
};

/// Errors that abort a bootstrap run.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The parameters were rejected before any node was created.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The seed could not be created; there is nothing to tear down.
    #[error("seed node failed")]
    Seed(#[source] CreateError),
    /// The seed was created but could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Creates the seed, then every other node in ordinal order.
///
/// Attempts are strictly sequential with a [`JoinDelay`] pause before each
/// non-seed attempt. A failed non-seed attempt is logged and skipped.
#[derive(Debug)]
pub struct Bootstrapper<B, D = FixedDelay> {
    config: BootstrapConfig,
    factory: NodeFactory<B>,
    delay: D,
}

impl<B: OverlayBackend> Bootstrapper<B> {
    /// Create a bootstrapper pausing by `config.delay` between attempts.
    pub fn new(config: BootstrapConfig, factory: NodeFactory<B>) -> Self {
        let delay = config.delay;
        Self {
            config,
            factory,
            delay,
        }
    }
}

impl<B: OverlayBackend, D: JoinDelay> Bootstrapper<B, D> {
    /// Replace the pause schedule.
    pub fn with_delay<D2: JoinDelay>(self, delay: D2) -> Bootstrapper<B, D2> {
        Bootstrapper {
            config: self.config,
            factory: self.factory,
            delay,
        }
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Run the bootstrap and return the registry of successfully joined nodes.
    pub async fn run(&self) -> Result<SwarmRegistry<B::Node>, BootstrapError> {
        let nodes = self.config.validate()?;
        let transport = self.config.transport;
        let base_port = self.config.base_port;

        let seed = self
            .factory
            .create(0, transport, base_port)
            .await
            .map_err(BootstrapError::Seed)?;
        let seed_port = seed.port();
        info!(ordinal = 0, port = seed_port, %transport, "seed node started");

        let mut registry = SwarmRegistry::new();
        if let Err((e, seed)) = registry.register(seed) {
            discard(&seed).await;
            return Err(e.into());
        }

        for ordinal in 1..nodes {
            let Some(port) = self.config.port_for(ordinal) else {
                // `validate` bounds the range.
                break;
            };

            tokio::time::sleep(self.delay.delay(ordinal)).await;

            match join(&self.factory, ordinal, transport, port, seed_port).await {
                Ok(handle) => {
                    if let Err((e, handle)) = registry.register(handle) {
                        warn!(ordinal, port, error = %e, "skipping node");
                        discard(&handle).await;
                        continue;
                    }
                    info!(ordinal, port, %transport, "node joined swarm");
                }
                Err(JoinError::Create(e)) => {
                    error!(ordinal, port, %transport, error = %e.source, "node creation failed, skipping");
                }
                Err(JoinError::Join {
                    handle, source, ..
                }) => {
                    error!(ordinal, port, seed_port, %transport, error = %source, "join failed, skipping");
                    discard(&handle).await;
                }
            }
        }

        info!(
            requested = nodes,
            registered = registry.len(),
            "bootstrap complete"
        );
        Ok(registry)
    }
}

/// Stop a node that will not be registered, releasing its listener.
async fn discard<N: flock_node_api::OverlayNode>(handle: &NodeHandle<N>) {
    if let Err(e) = handle.stop().await {
        warn!(ordinal = handle.ordinal(), port = handle.port(), error = %e, "failed to stop discarded node");
    }
}
