//! Concurrency-bounded, start-throttled execution of upstream requests.
//!
//! Every outbound call goes through one shared [`RequestScheduler`]. At most
//! `max_concurrency` tasks run at once; further tasks queue in FIFO order.
//! Independently, consecutive task *starts* are spaced at least
//! `min_interval` apart.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;
use venuescout_core::AppConfig;

use crate::error::PlacesError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub max_concurrency: usize,
    pub min_interval: Duration,
    pub timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            min_interval: Duration::from_millis(120),
            timeout: Duration::from_millis(12_000),
        }
    }
}

impl From<&AppConfig> for SchedulerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency.max(1),
            min_interval: Duration::from_millis(config.min_interval_ms),
            timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }
}

pub struct RequestScheduler {
    config: SchedulerConfig,
    slots: Semaphore,
    last_start: Mutex<Option<Instant>>,
    in_flight: AtomicUsize,
}

impl RequestScheduler {
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        let config = SchedulerConfig {
            max_concurrency: config.max_concurrency.max(1),
            ..config
        };
        Self {
            slots: Semaphore::new(config.max_concurrency),
            last_start: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// Number of tasks currently running (not counting queued ones).
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Runs `task` once a slot is free and the start throttle allows it.
    ///
    /// The slot is released when the task finishes or is dropped, whatever
    /// its outcome.
    pub async fn submit<F, T>(&self, task: F) -> T
    where
        F: Future<Output = T>,
    {
        // The semaphore is never closed, so acquisition only fails if that changes.
        let _permit = self.slots.acquire().await.ok();
        self.wait_for_start_slot().await;
        let _running = InFlight::enter(&self.in_flight);
        task.await
    }

    /// Like [`RequestScheduler::submit`], bounding the task's run time by the
    /// configured timeout. Time spent queued does not count.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Timeout`] when the task does not finish in time;
    /// the task future is dropped. Otherwise returns the task's own result.
    pub async fn submit_with_timeout<F, T>(&self, task: F) -> Result<T, PlacesError>
    where
        F: Future<Output = Result<T, PlacesError>>,
    {
        let timeout = self.config.timeout;
        self.submit(async move {
            match tokio::time::timeout(timeout, task).await {
                Ok(result) => result,
                Err(_) => Err(PlacesError::Timeout {
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }),
            }
        })
        .await
    }

    async fn wait_for_start_slot(&self) {
        let mut last = self.last_start.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.config.min_interval {
                tokio::time::sleep(self.config.min_interval.saturating_sub(elapsed)).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for RequestScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;
