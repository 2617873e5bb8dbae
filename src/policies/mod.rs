//! Restart policies for pipeline tasks.
//!
//! The pipeline loops never finish on their own; these knobs only matter
//! when a loop returns an error or panics.
//!
//! ## Contents
//! - [`RestartPolicy`] when to restart a task (never / on-failure / always)
//! - [`BackoffPolicy`] how the restart delay grows (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization applied to the delay
//!
//! ## Watchdog interaction
//! An actor waiting in backoff does not report liveness. A delay longer than
//! `Config::watchdog_timeout` therefore ends in a device restart, which is the
//! intended escalation for a task that keeps failing.

mod backoff;
mod jitter;
mod restart;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use restart::RestartPolicy;
