//! Stop task metrics

use core::fmt;
use metrics::Counter;

/// Counters for the stop tasks dispatched during swarm shutdown.
#[derive(Clone, Debug)]
pub struct StopTaskMetrics {
    /// Number of spawned stop tasks
    stop_tasks_total: Counter,
    /// Number of finished stop tasks, including ones that failed or panicked
    finished_stop_tasks_total: Counter,
    /// Number of stop calls that returned an error
    failed_stop_tasks_total: Counter,
}

impl Default for StopTaskMetrics {
    fn default() -> Self {
        Self {
            stop_tasks_total: metrics::counter!("swarm.shutdown.stop_tasks_total"),
            finished_stop_tasks_total: metrics::counter!(
                "swarm.shutdown.finished_stop_tasks_total"
            ),
            failed_stop_tasks_total: metrics::counter!("swarm.shutdown.failed_stop_tasks_total"),
        }
    }
}

impl StopTaskMetrics {
    /// Counts a dispatched stop task. The returned guard marks it finished when
    /// dropped, so a task that panics mid-stop is still counted once unwound.
    pub fn spawned(&self) -> StopTaskGuard {
        self.stop_tasks_total.increment(1);
        StopTaskGuard {
            finished: self.finished_stop_tasks_total.clone(),
        }
    }

    /// Counts a stop call that returned an error.
    pub fn failed(&self) {
        self.failed_stop_tasks_total.increment(1);
    }
}

/// Held by a running stop task; see [`StopTaskMetrics::spawned`].
#[must_use = "dropping the guard immediately counts the stop task as finished"]
pub struct StopTaskGuard {
    finished: Counter,
}

impl fmt::Debug for StopTaskGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopTaskGuard").finish_non_exhaustive()
    }
}

impl Drop for StopTaskGuard {
    fn drop(&mut self) {
        self.finished.increment(1);
    }
}

#[cfg(test)]
mod tests {
    use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

    use super::*;

    fn counter(snapshotter: &Snapshotter, name: &str) -> u64 {
        snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .find_map(|(key, _, _, value)| match value {
                DebugValue::Counter(n) if key.key().name() == name => Some(n),
                _ => None,
            })
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_panicked_stop_task_is_counted_finished() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        let metrics = metrics::with_local_recorder(&recorder, StopTaskMetrics::default);

        let guard = metrics.spawned();
        assert_eq!(counter(&snapshotter, "swarm.shutdown.stop_tasks_total"), 1);
        assert_eq!(counter(&snapshotter, "swarm.shutdown.finished_stop_tasks_total"), 0);

        let task = tokio::spawn(async move {
            let _guard = guard;
            panic!("stop blew up");
        });
        assert!(task.await.unwrap_err().is_panic());

        assert_eq!(counter(&snapshotter, "swarm.shutdown.finished_stop_tasks_total"), 1);
        assert_eq!(counter(&snapshotter, "swarm.shutdown.failed_stop_tasks_total"), 0);
    }

    #[test]
    fn test_failed_stop_is_counted() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        let metrics = metrics::with_local_recorder(&recorder, StopTaskMetrics::default);

        metrics.failed();
        drop(metrics.spawned());

        assert_eq!(counter(&snapshotter, "swarm.shutdown.failed_stop_tasks_total"), 1);
        assert_eq!(counter(&snapshotter, "swarm.shutdown.finished_stop_tasks_total"), 1);
    }
}
