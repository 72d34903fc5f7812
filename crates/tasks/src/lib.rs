//! Task coordination primitives.
//!
//! - [`signal`] creates a one-shot shutdown channel: a [`Signal`] that fires it and a
//!   cloneable [`Shutdown`] future that resolves once it has fired.
//! - [`CompletionBarrier`] counts outstanding tasks and resolves once every
//!   [`CompletionGuard`] has been dropped.
//! - [`metrics`] holds the counters recorded for spawned stop tasks.

mod barrier;
pub mod metrics;
mod shutdown;

pub use barrier::{CompletionBarrier, CompletionGuard};
pub use shutdown::{Shutdown, Signal, signal};
