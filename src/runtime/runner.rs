//! # Run a single pass of a task loop.
//!
//! Executes one run of a [`Task`] and publishes its terminal event:
//!
//! ```text
//! task.run() → Ok(())          → TaskStopped
//! task.run() → Err(Canceled)   → TaskStopped (graceful exit)
//! task.run() → Err(Fail/Fatal) → TaskFailed
//! task.run() → panic           → TaskFailed, returned as Err(Fail)
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event.
//! - A panic inside the loop is contained here so the actor can restart it.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::{
    error::TaskError,
    events::{Bus, Event, EventKind},
    tasks::Task,
};

/// Executes one run of `task`, publishing its terminal event to `bus`.
pub async fn run_once<T: Task + ?Sized>(
    task: &T,
    token: &CancellationToken,
    attempt: u32,
    bus: &Bus,
) -> Result<(), TaskError> {
    let res = match AssertUnwindSafe(task.run(token.clone()))
        .catch_unwind()
        .await
    {
        Ok(r) => r,
        Err(panic) => Err(TaskError::Fail {
            error: format!("panicked: {}", panic_message(panic.as_ref())),
        }),
    };

    match &res {
        Ok(()) | Err(TaskError::Canceled) => {
            bus.publish(
                Event::new(EventKind::TaskStopped)
                    .with_task(task.name())
                    .with_attempt(attempt),
            );
        }
        Err(e) => {
            bus.publish(
                Event::new(EventKind::TaskFailed)
                    .with_task(task.name())
                    .with_attempt(attempt)
                    .with_reason(e.as_message()),
            );
        }
    }
    res
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
