//! # Task watchdog.
//!
//! Every pipeline task is registered once at startup and must call
//! [`WatchdogHandle::report_liveness`] once per cycle. [`Watchdog::monitor`]
//! checks the registry periodically and resolves with
//! [`RuntimeError::WatchdogExpired`] for the first task that stayed silent for
//! longer than the timeout; the device then shuts down and reports the error,
//! which the host turns into a restart.
//!
//! ```text
//! register("generator") ──► entry{name, last_report}
//!                              ▲
//! handle.report_liveness() ────┘  (every cycle)
//!
//! monitor(): every check interval
//!   └─ now - last_report > timeout ? ──► Err(WatchdogExpired{task})
//! ```
//!
//! ## Rules
//! - Registration starts the clock; a task that never reports expires after one timeout.
//! - Registering the same name twice returns the existing entry and restarts its clock.
//! - Tasks are checked in registration order.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::RuntimeError;

struct Entry {
    name: Arc<str>,
    last_report: Mutex<Instant>,
}

impl Entry {
    fn touch(&self) {
        *self.last_report.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn silent_for(&self, now: Instant) -> Duration {
        let last = *self.last_report.lock().unwrap_or_else(PoisonError::into_inner);
        now.saturating_duration_since(last)
    }
}

/// Registry of tasks that must prove liveness within a deadline.
pub struct Watchdog {
    timeout: Duration,
    check_every: Duration,
    entries: RwLock<Vec<Arc<Entry>>>,
}

impl Watchdog {
    /// Creates a watchdog checking every `timeout / 5`.
    pub fn new(timeout: Duration) -> Self {
        Self::with_check_interval(timeout, (timeout / 5).max(Duration::from_millis(1)))
    }

    /// Creates a watchdog with an explicit check interval.
    pub fn with_check_interval(timeout: Duration, check_every: Duration) -> Self {
        Self {
            timeout,
            check_every,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Registers a task and returns the handle it reports through.
    pub fn register(&self, name: &str) -> WatchdogHandle {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.iter().find(|e| &*e.name == name) {
            existing.touch();
            return WatchdogHandle {
                entry: Arc::clone(existing),
            };
        }

        let entry = Arc::new(Entry {
            name: Arc::from(name),
            last_report: Mutex::new(Instant::now()),
        });
        entries.push(Arc::clone(&entry));
        WatchdogHandle { entry }
    }

    /// Restarts the clock of every registered task.
    ///
    /// Called when the device starts its tasks, so time spent between
    /// registration and start does not count.
    pub fn rearm(&self) {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        for entry in entries.iter() {
            entry.touch();
        }
    }

    /// Sorted names of registered tasks.
    pub fn registered(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = entries.iter().map(|e| e.name.to_string()).collect();
        names.sort_unstable();
        names
    }

    /// First registered task that has been silent longer than the timeout.
    pub fn overdue(&self) -> Option<String> {
        let now = Instant::now();
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .find(|e| e.silent_for(now) > self.timeout)
            .map(|e| e.name.to_string())
    }

    /// Checks the registry until a task expires or `token` is cancelled.
    pub async fn monitor(&self, token: CancellationToken) -> Result<(), RuntimeError> {
        let mut ticker = time::interval(self.check_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => return Ok(()),
                _ = ticker.tick() => {}
            }
            if let Some(task) = self.overdue() {
                return Err(RuntimeError::WatchdogExpired {
                    task,
                    timeout: self.timeout,
                });
            }
        }
    }
}

/// Per-task reporting handle.
#[derive(Clone)]
pub struct WatchdogHandle {
    entry: Arc<Entry>,
}

impl WatchdogHandle {
    /// Proves the task is still making progress; resets its deadline.
    pub fn report_liveness(&self) {
        self.entry.touch();
    }

    /// Name the task was registered under.
    pub fn name(&self) -> &str {
        &self.entry.name
    }
}
