//! # handoff
//!
//! **handoff** is a three-task producer/consumer/supervisor pipeline for a
//! single device: a generator produces numbered items, a receiver consumes and
//! validates them, and a supervisor reports aggregate health from the liveness
//! flags both of them raise.
//!
//! The interesting part is the coordination between the tasks:
//! - a **single-slot channel** whose send never blocks; a second item while one
//!   is in flight is dropped (deliberate backpressure);
//! - a **two-flag liveness signal** that the supervisor reads and clears in one step;
//! - a **timeout-driven escalation policy** in the receiver (warn on the 3rd
//!   consecutive timeout, reset the channel on the 5th).
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐  try_send   ┌──────────────┐  receive    ┌──────────────┐
//!     │  Generator   ├────────────►│   Channel    ├────────────►│   Receiver   │
//!     │ (item source)│  (drop if   │  (1 slot)    │  (timeout)  │ (validation) │
//!     └──────┬───────┘   full)     └──────────────┘             └──────┬───────┘
//!            │ signal(PRODUCER)                        signal(CONSUMER)│
//!            │              ┌──────────────────────┐                   │
//!            └─────────────►│    LivenessSignal    │◄──────────────────┘
//!                           └──────────┬───────────┘
//!                                      │ observe_and_clear(window)
//!                                      ▼
//!                           ┌──────────────────────┐
//!                           │      Supervisor      │──► HealthReport
//!                           └──────────────────────┘
//!
//! every task, every cycle:  WatchdogHandle::report_liveness()
//! ```
//!
//! ### Runtime
//! ```text
//! Device::builder(cfg).build()
//!   ├─► Config::validate()                     (ResourceCreation on failure)
//!   ├─► Bus, Shared{Channel, LivenessSignal, ItemPool}
//!   └─► Watchdog::register(generator | receiver | supervisor)
//!
//! Device::run()
//!   ├─► TaskActor per task (restart on failure with backoff)
//!   ├─► Watchdog::monitor()  ─► WatchdogExpired ─► Err (host restarts the process)
//!   ├─► OS signal            ─► cancel, wait up to grace
//!   └─► Bus ─► SubscriberSet ─► LogWriter ("[handoff] [TX] generator sent id=1 value=1")
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                          |
//! |-------------------|----------------------------------------------------------|---------------------------------------------|
//! | **Primitives**    | Handoff channel, liveness flags, bounded item pool.      | [`Channel`], [`LivenessSignal`], [`ItemPool`] |
//! | **Pipeline**      | The three loops, drivable one cycle at a time.           | [`Generator`], [`Receiver`], [`Supervisor`] |
//! | **Runtime**       | Startup, watchdog, restart and shutdown.                 | [`Device`], [`Watchdog`], [`Config`]        |
//! | **Events**        | Tagged events and subscribers.                           | [`Event`], [`Category`], [`Subscribe`], [`LogWriter`] |
//! | **Policies**      | Restart/backoff strategies for the task actors.          | [`RestartPolicy`], [`BackoffPolicy`]        |
//! | **Errors**        | Typed errors per layer.                                  | [`TaskError`], [`RuntimeError`]             |
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use handoff::{Config, Device, LogWriter, Subscribe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default().with_tick(Duration::from_millis(200));
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new(cfg.log_prefix.clone()))];
//!
//!     let device = Device::builder(cfg).with_subscribers(subs).build()?;
//!     device
//!         .run_until(tokio::time::sleep(Duration::from_secs(5)))
//!         .await?;
//!     Ok(())
//! }
//! ```
mod error;
mod events;
mod pipeline;
mod policies;
mod primitives;
mod runtime;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use error::{AllocError, ItemError, RecvTimeout, RuntimeError, TaskError, TrySendError};
pub use events::{Bus, Category, Event, EventKind};
pub use pipeline::{
    Generator, Health, Item, ItemChannel, ProduceOutcome, ReceiveOutcome, Receiver, RetryState,
    Shared, Supervisor,
};
pub use policies::{BackoffPolicy, JitterPolicy, RestartPolicy};
pub use primitives::{Channel, ItemPool, Liveness, LivenessSignal, Pooled};
pub use runtime::{Config, Device, DeviceBuilder, Watchdog, WatchdogHandle};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use tasks::{Task, TaskRef, TaskSpec};
