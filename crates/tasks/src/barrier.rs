//! Counting completion barrier.

use tokio_util::task::{TaskTracker, task_tracker::TaskTrackerToken};

/// Waits until a known number of concurrent tasks have signalled completion.
///
/// Every task takes a [`CompletionGuard`] via [`enter`](Self::enter) before it is
/// spawned and drops it when done. [`wait`](Self::wait) resolves once no guards
/// remain. A guard dropped by a panicking task still counts as a completion.
#[derive(Debug, Clone, Default)]
pub struct CompletionBarrier {
    tracker: TaskTracker,
}

impl CompletionBarrier {
    /// Create an empty barrier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one more task that must complete before [`wait`](Self::wait) resolves.
    pub fn enter(&self) -> CompletionGuard {
        CompletionGuard(self.tracker.token())
    }

    /// Number of guards that have not been dropped yet.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every guard handed out by [`enter`](Self::enter) has been dropped.
    ///
    /// Resolves immediately if there are no outstanding guards.
    pub async fn wait(&self) {
        // The tracker only resolves once closed; closing does not stop later
        // `enter` calls from being counted.
        self.tracker.close();
        self.tracker.wait().await;
    }
}

/// Completion token for one task registered on a [`CompletionBarrier`].
#[derive(Debug)]
#[must_use = "dropping the guard immediately counts the task as complete"]
pub struct CompletionGuard(TaskTrackerToken);
