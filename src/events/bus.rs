//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]:
//!
//! ```text
//!   Generator ──┐
//!   Receiver  ──┼──────► Bus ───────► subscriber listener ────► SubscriberSet
//!   Supervisor──┤  (broadcast chan)      (in Device)
//!   Actors    ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: a pipeline loop never waits on logging.
//! - **Bounded capacity**: slow receivers observe `RecvError::Lagged(n)`.
//! - **No persistence**: events are lost if nobody subscribed at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone; every clone publishes into the same ring buffer.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers; returns immediately.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn publish_without_receivers_is_silent() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::ShutdownRequested));
    }

    #[test]
    fn receiver_sees_later_events_only() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::ShutdownRequested));
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::ItemSent).with_item(1, 1));

        let ev = rx.try_recv().expect("one event");
        assert_eq!(ev.kind, EventKind::ItemSent);
        assert!(rx.try_recv().is_err());
    }
}
