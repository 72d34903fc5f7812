//! Pause between bootstrap attempts.

use std::time::Duration;

/// Pause applied before each non-seed attempt.
pub const DEFAULT_JOIN_DELAY: Duration = Duration::from_micros(112_358);

/// Decides how long the bootstrap driver waits before attempting `ordinal`.
///
/// Implemented for any `Fn(usize) -> Duration`, so a backoff curve can be
/// passed as a closure.
pub trait JoinDelay: Send + Sync {
    fn delay(&self, ordinal: usize) -> Duration;
}

/// The same pause before every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl Default for FixedDelay {
    fn default() -> Self {
        Self(DEFAULT_JOIN_DELAY)
    }
}

impl JoinDelay for FixedDelay {
    fn delay(&self, _ordinal: usize) -> Duration {
        self.0
    }
}

/// No pause at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl JoinDelay for NoDelay {
    fn delay(&self, _ordinal: usize) -> Duration {
        Duration::ZERO
    }
}

impl<F> JoinDelay for F
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    fn delay(&self, ordinal: usize) -> Duration {
        self(ordinal)
    }
}
