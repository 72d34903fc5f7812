//! Swarm bootstrap and lifecycle orchestration.
//!
//! A run creates one seed node, joins the remaining nodes to it one at a time,
//! then waits for a shutdown trigger and stops every node concurrently:
//!
//! - [`NodeFactory`] configures and starts single nodes.
//! - [`join()`] creates a node and joins it to the seed.
//! - [`Bootstrapper`] drives the sequential bootstrap with skip-on-failure.
//! - [`SwarmRegistry`] holds the nodes that made it, seed first.
//! - [`ShutdownCoordinator`] stops them in reverse order behind a barrier.
//! - [`SwarmRunner`] ties the phases together.

mod bootstrap;
mod config;
mod delay;
mod factory;
mod handle;
mod join;
mod registry;
mod runner;
mod shutdown;

pub use bootstrap::{BootstrapError, Bootstrapper};
pub use config::{BootstrapConfig, ConfigError, DEFAULT_BASE_PORT, DEFAULT_NODES};
pub use delay::{DEFAULT_JOIN_DELAY, FixedDelay, JoinDelay, NoDelay};
pub use factory::{CreateError, NodeFactory};
pub use handle::{NodeHandle, NodeState, StopOutcome, join_address};
pub use join::{JoinError, join};
pub use registry::{RegistryError, SwarmRegistry};
pub use runner::{SwarmPhase, SwarmRunner};
pub use shutdown::{ShutdownCoordinator, ShutdownReport, StopFailure};
