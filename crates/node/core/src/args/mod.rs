//! CLI argument structs.
//!
//! Swarm flags are all optional so that only flags actually given on the
//! command line override the loaded configuration.

mod log;
mod swarm;

pub use log::LogArgs;
pub use swarm::SwarmArgs;
