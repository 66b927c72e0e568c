//! Cancelable periodic tasks.
//!
//! # Responsibility
//! - Run one async job on a fixed period on the tokio runtime.
//! - Restart the job only when its governing key changes.
//!
//! # Invariants
//! - At most one task runs per `ScheduledTask`; a restart aborts the old one
//!   before spawning the new one.
//! - The first run happens one full period after (re)start.
//! - Missed ticks are delayed, never bursted.

use log::{debug, warn};
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub struct ScheduledTask<K> {
    name: &'static str,
    key: Option<K>,
    handle: Option<JoinHandle<()>>,
}

impl<K: PartialEq + Debug> ScheduledTask<K> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            key: None,
            handle: None,
        }
    }

    /// Ensures the job runs every `period` under `key`.
    ///
    /// Returns true when a new task was spawned. A zero period cancels the
    /// task instead.
    pub fn ensure<F, Fut>(&mut self, key: K, period: Duration, job: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.is_running() && self.key.as_ref() == Some(&key) {
            return false;
        }
        self.cancel();
        if period.is_zero() {
            warn!(
                "event=schedule_rejected module=session schedule={} reason=zero_period",
                self.name
            );
            return false;
        }

        debug!(
            "event=schedule_started module=session schedule={} period_ms={} key={:?}",
            self.name,
            period.as_millis(),
            key
        );
        self.handle = Some(tokio::spawn(run_every(period, job)));
        self.key = Some(key);
        true
    }

    /// Stops the task if one is running.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!(
                "event=schedule_cancelled module=session schedule={}",
                self.name
            );
        }
        self.key = None;
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }
}

impl<K> Drop for ScheduledTask<K> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run_every<F, Fut>(period: Duration, mut job: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        job().await;
    }
}
