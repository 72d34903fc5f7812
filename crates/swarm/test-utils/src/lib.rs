//! Test utilities for flock swarm crates.
//!
//! [`MockBackend`] hands out [`MockNode`]s that record every collaborator call
//! in a shared, ordered log and fail on demand, keyed by listening port.

mod mock;

pub use mock::{Call, MockBackend, MockNode};
