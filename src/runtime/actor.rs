//! # TaskActor: keeps one pipeline task running.
//!
//! The pipeline loops never return on their own. An actor exists for the
//! unexpected case: a loop that fails or panics is restarted per
//! [`RestartPolicy`] after a [`BackoffPolicy`] delay.
//!
//! ```text
//! loop {
//!   ├─► publish TaskStarting{run}
//!   ├─► run_once()
//!   │     ├─ Ok              ─► Always: restart; otherwise ActorExhausted, exit
//!   │     ├─ Err(Canceled)   ─► exit
//!   │     ├─ Err(Fail)       ─► OnFailure/Always: BackoffScheduled, sleep, restart
//!   │     └─ Err(Fatal)      ─► ActorExhausted, exit
//!   └─► cancellation checked before every run and during backoff
//! }
//! ```
//!
//! ## Rules
//! - Runs are **sequential** within one actor.
//! - The run counter is monotonic; the backoff exponent resets after a clean return.

use std::sync::Arc;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::{
    error::TaskError,
    events::{Bus, Event, EventKind},
    policies::{BackoffPolicy, RestartPolicy},
    runtime::runner::run_once,
    tasks::{Task, TaskSpec},
};

/// Supervises repeated runs of a single [`Task`].
pub struct TaskActor {
    task: Arc<dyn Task>,
    restart: RestartPolicy,
    backoff: BackoffPolicy,
    bus: Bus,
}

impl TaskActor {
    /// Creates an actor for the given spec.
    pub fn new(spec: &TaskSpec, bus: Bus) -> Self {
        Self {
            task: Arc::clone(spec.task()),
            restart: spec.restart(),
            backoff: spec.backoff(),
            bus,
        }
    }

    /// Runs the actor until its policy gives up or `token` is cancelled.
    pub async fn run(self, token: CancellationToken) {
        let mut run: u32 = 0;
        let mut failures: u32 = 0;

        loop {
            if token.is_cancelled() {
                break;
            }
            run = run.saturating_add(1);
            self.bus.publish(
                Event::new(EventKind::TaskStarting)
                    .with_task(self.task.name())
                    .with_attempt(run),
            );

            match run_once(self.task.as_ref(), &token, run, &self.bus).await {
                Ok(()) => {
                    failures = 0;
                    if !self.restart.restarts_on_success() {
                        self.exhausted(run, None);
                        break;
                    }
                }
                Err(TaskError::Canceled) => break,
                Err(e) if e.is_retryable() && self.restart.restarts_on_failure() => {
                    let delay = self.backoff.next(failures);
                    failures = failures.saturating_add(1);

                    self.bus.publish(
                        Event::new(EventKind::BackoffScheduled)
                            .with_task(self.task.name())
                            .with_attempt(run)
                            .with_delay(delay)
                            .with_reason(e.as_message()),
                    );

                    select! {
                        _ = time::sleep(delay) => {}
                        _ = token.cancelled() => break,
                    }
                }
                Err(e) => {
                    self.exhausted(run, Some(e.as_message()));
                    break;
                }
            }
        }
    }

    fn exhausted(&self, run: u32, reason: Option<String>) {
        let mut ev = Event::new(EventKind::ActorExhausted)
            .with_task(self.task.name())
            .with_attempt(run);
        if let Some(reason) = reason {
            ev = ev.with_reason(reason);
        }
        self.bus.publish(ev);
    }
}
