//! The three pipeline loops and the state they share.
//!
//! ```text
//!   Generator ──try_send──► Channel (1 slot) ──receive──► Receiver
//!       │                                                    │
//!       └── signal(PRODUCER) ──► LivenessSignal ◄── signal(CONSUMER)
//!                                      │
//!                         observe_and_clear (window)
//!                                      ▼
//!                                  Supervisor ──► HealthReport
//! ```
//!
//! Each loop owns its cycle logic as a method (`cycle`) that can be driven
//! directly, and implements [`Task`](crate::Task) by repeating that cycle,
//! reporting to the watchdog and pacing itself.

mod generator;
mod item;
mod receiver;
mod supervisor;

use std::sync::Arc;

use crate::events::Bus;
use crate::primitives::{Channel, ItemPool, LivenessSignal, Pooled};

pub use generator::{Generator, ProduceOutcome};
pub use item::Item;
pub use receiver::{ReceiveOutcome, Receiver, RetryState};
pub use supervisor::{Health, Supervisor};

/// Channel carrying pooled items from generator to receiver.
pub type ItemChannel = Channel<Pooled<Item>>;

/// Handles to the shared primitives, cloned into every loop.
#[derive(Clone)]
pub struct Shared {
    channel: Arc<ItemChannel>,
    liveness: Arc<LivenessSignal>,
    pool: ItemPool,
    bus: Bus,
}

impl Shared {
    /// Creates an empty channel, cleared liveness flags and a pool of `pool_capacity` slots.
    pub fn new(pool_capacity: usize, bus: Bus) -> Self {
        Self {
            channel: Arc::new(Channel::new()),
            liveness: Arc::new(LivenessSignal::new()),
            pool: ItemPool::new(pool_capacity),
            bus,
        }
    }

    pub fn channel(&self) -> &ItemChannel {
        &self.channel
    }

    pub fn liveness(&self) -> &LivenessSignal {
        &self.liveness
    }

    pub fn pool(&self) -> &ItemPool {
        &self.pool
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use tokio::sync::broadcast;

    use crate::events::{Bus, Event, EventKind};

    /// Everything published so far.
    pub(crate) fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    pub(crate) fn kinds(events: &[Event]) -> Vec<EventKind> {
        events.iter().map(|e| e.kind).collect()
    }

    pub(crate) fn bus() -> (Bus, broadcast::Receiver<Event>) {
        let bus = Bus::new(256);
        let rx = bus.subscribe();
        (bus, rx)
    }
}
