//! Background removal of expired entries.

use crate::TtlCache;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running sweeper task. Dropping it stops the sweeper.
#[derive(Debug)]
pub struct SweeperHandle {
    task: JoinHandle<()>,
}

impl SweeperHandle {
    pub(crate) fn spawn<V>(cache: &TtlCache<V>) -> Self
    where
        V: Clone + Send + 'static,
    {
        let weak = cache.downgrade();
        let period = cache
            .config()
            .sweep_interval()
            .max(std::time::Duration::from_millis(1));

        #[cfg(feature = "tracing")]
        tracing::debug!(cache = %cache.name(), ?period, "starting cache sweeper");

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                TtlCache::from_shared(inner).sweep();
            }
        });

        Self { task }
    }

    /// Stops the sweeper.
    pub fn stop(self) {
        self.task.abort();
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
