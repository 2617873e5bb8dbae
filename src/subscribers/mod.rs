//! # Event subscribers.
//!
//! Everything the device reports goes through the [`Bus`](crate::events::Bus)
//! as an [`Event`](crate::events::Event). Subscribers turn those events into
//! output; [`LogWriter`] is the built-in one and prints one tagged line per event.
//!
//! ```text
//! Generator / Receiver / Supervisor / TaskActor / Device
//!        │ publish(Event)
//!        ▼
//!       Bus ──► listener ──► SubscriberSet::emit
//!                                 ├──► [queue] ──► LogWriter ──► stdout
//!                                 └──► [queue] ──► custom Subscribe impl
//! ```
//!
//! ## Implementing a subscriber
//! ```no_run
//! use handoff::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct DropCounter;
//!
//! #[async_trait]
//! impl Subscribe for DropCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::ItemDropped {
//!             // count it
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "drop-counter"
//!     }
//! }
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
