//! Runtime events: types and broadcast bus.
//!
//! Every outcome of the pipeline loops and of the device runtime is published
//! as one [`Event`]. Subscribers (the built-in `LogWriter` among them) turn
//! events into log lines, metrics or test assertions.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload
//! - [`Category`] the log channel tag of an event (`TX`, `RX`, `FILA`, ...)
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Generator`, `Receiver`, `Supervisor` loops, task actors,
//!   the device runtime, `SubscriberSet` workers.
//! - **Consumers**: the device's subscriber listener (fans out to `SubscriberSet`).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Category, Event, EventKind};
