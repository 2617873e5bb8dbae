//! # Supervisor: the observer loop.
//!
//! Each cycle waits up to one observation window for either liveness flag,
//! clears what it saw and publishes a [`Health`] report. It never feeds back
//! into the other loops.
//!
//! ```text
//! observe_and_clear(PRODUCER | CONSUMER, window)
//!   ├─ both      ──► Healthy       (SUP)
//!   ├─ producer  ──► ProducerOnly  (SUP)
//!   ├─ consumer  ──► ConsumerOnly  (SUP)
//!   └─ none      ──► Silent        (FALHA)
//! report_liveness, sleep(supervise_interval)
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::events::{Event, EventKind};
use crate::pipeline::Shared;
use crate::primitives::Liveness;
use crate::runtime::WatchdogHandle;
use crate::tasks::Task;

/// Aggregate health derived from one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Health {
    Healthy,
    ProducerOnly,
    ConsumerOnly,
    Silent,
}

impl Health {
    /// Classifies the flags returned by one observation.
    pub fn classify(seen: Liveness) -> Self {
        match (
            seen.contains(Liveness::PRODUCER),
            seen.contains(Liveness::CONSUMER),
        ) {
            (true, true) => Health::Healthy,
            (true, false) => Health::ProducerOnly,
            (false, true) => Health::ConsumerOnly,
            (false, false) => Health::Silent,
        }
    }

    /// True unless neither side made progress.
    pub fn is_alive(self) -> bool {
        self != Health::Silent
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Health::Healthy => "fully healthy",
            Health::ProducerOnly => "partially healthy (producer only)",
            Health::ConsumerOnly => "partially healthy (consumer only)",
            Health::Silent => "failure: silence from both",
        })
    }
}

/// Observer loop.
pub struct Supervisor {
    shared: Shared,
    watchdog: WatchdogHandle,
    window: Duration,
    interval: Duration,
}

impl Supervisor {
    pub const NAME: &'static str = "supervisor";

    pub fn new(shared: Shared, watchdog: WatchdogHandle, window: Duration, interval: Duration) -> Self {
        Self {
            shared,
            watchdog,
            window,
            interval,
        }
    }

    /// Observes one window and publishes the resulting report.
    pub async fn cycle(&self) -> Health {
        let seen = self
            .shared
            .liveness()
            .observe_and_clear(Liveness::all(), self.window)
            .await;
        let health = Health::classify(seen);

        self.shared.bus().publish(
            Event::new(EventKind::HealthReport)
                .with_task(Self::NAME)
                .with_health(health)
                .with_reason(health.to_string()),
        );
        health
    }
}

#[async_trait]
impl Task for Supervisor {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        loop {
            tokio::select! {
                _ = self.cycle() => {}
                _ = ctx.cancelled() => return Err(TaskError::Canceled),
            }
            self.watchdog.report_liveness();

            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = ctx.cancelled() => return Err(TaskError::Canceled),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Category;
    use crate::pipeline::testing::{bus, drain};
    use crate::runtime::Watchdog;
    use tokio::sync::broadcast;
    use tokio::time::Instant;

    const WINDOW: Duration = Duration::from_secs(2);

    fn supervisor() -> (Supervisor, Shared, broadcast::Receiver<Event>) {
        let (bus, rx) = bus();
        let shared = Shared::new(4, bus);
        let wd = Watchdog::new(Duration::from_secs(5));
        let s = Supervisor::new(shared.clone(), wd.register(Supervisor::NAME), WINDOW, WINDOW);
        (s, shared, rx)
    }

    #[test]
    fn classification_and_wording() {
        assert_eq!(Health::classify(Liveness::all()), Health::Healthy);
        assert_eq!(Health::classify(Liveness::PRODUCER), Health::ProducerOnly);
        assert_eq!(Health::classify(Liveness::CONSUMER), Health::ConsumerOnly);
        assert_eq!(Health::classify(Liveness::empty()), Health::Silent);
        assert_eq!(Health::Silent.to_string(), "failure: silence from both");
        assert!(!Health::Silent.is_alive());
    }

    #[tokio::test(start_paused = true)]
    async fn both_signals_then_silence() {
        let (s, shared, mut rx) = supervisor();
        shared.liveness().signal(Liveness::PRODUCER);
        shared.liveness().signal(Liveness::CONSUMER);

        assert_eq!(s.cycle().await, Health::Healthy);

        let start = Instant::now();
        assert_eq!(s.cycle().await, Health::Silent);
        assert!(start.elapsed() >= WINDOW);

        let events = drain(&mut rx);
        assert_eq!(events[0].category(), Category::Sup);
        assert_eq!(events[1].category(), Category::Failure);
        assert_eq!(events[1].health, Some(Health::Silent));
    }

    #[tokio::test(start_paused = true)]
    async fn producer_only_does_not_leak_consumer() {
        let (s, shared, _rx) = supervisor();
        shared.liveness().signal(Liveness::PRODUCER);

        assert_eq!(s.cycle().await, Health::ProducerOnly);
        assert_eq!(s.cycle().await, Health::Silent);
    }

    #[tokio::test(start_paused = true)]
    async fn signal_inside_window_wakes_observer() {
        let (s, shared, _rx) = supervisor();
        let signaler = {
            let shared = shared.clone();
            tokio::spawn(async move {
                time::sleep(Duration::from_millis(500)).await;
                shared.liveness().signal(Liveness::CONSUMER);
            })
        };

        let start = Instant::now();
        assert_eq!(s.cycle().await, Health::ConsumerOnly);
        assert!(start.elapsed() < WINDOW);
        signaler.await.unwrap();
    }
}
