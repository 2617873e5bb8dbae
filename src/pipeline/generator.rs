//! # Generator: the producer loop.
//!
//! ```text
//! every produce_interval:
//!   alloc Item{id = next_seq}
//!     ├─ pool exhausted ──► AllocationFailed (no id consumed)
//!     └─ ok ──► next_seq += 1, try_send
//!                 ├─ Ok       ──► signal(PRODUCER), ItemSent
//!                 └─ Full(it) ──► drop(it), ItemDropped
//!   report_liveness, sleep
//! ```
//!
//! Dropping on a full channel is the backpressure policy; the item is never
//! retried. Ids are never reused, not even across restarts of the loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::{TaskError, TrySendError};
use crate::events::{Event, EventKind};
use crate::pipeline::{Item, Shared};
use crate::primitives::Liveness;
use crate::runtime::WatchdogHandle;
use crate::tasks::Task;

/// Result of one generator cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProduceOutcome {
    /// Item handed to the receiver.
    Sent(Item),
    /// Channel was full; item destroyed.
    Dropped(Item),
    /// No pool slot; nothing produced.
    AllocationFailed,
}

/// Producer loop.
pub struct Generator {
    shared: Shared,
    watchdog: WatchdogHandle,
    interval: Duration,
    next_seq: AtomicU64,
}

impl Generator {
    pub const NAME: &'static str = "generator";

    pub fn new(shared: Shared, watchdog: WatchdogHandle, interval: Duration) -> Self {
        Self {
            shared,
            watchdog,
            interval,
            next_seq: AtomicU64::new(1),
        }
    }

    /// Produces one item and tries to hand it off.
    pub fn cycle(&self) -> ProduceOutcome {
        let seq = self.next_seq.load(Ordering::Relaxed);
        let item = match self.shared.pool().alloc(Item::new(seq)) {
            Ok(item) => item,
            Err(e) => {
                self.shared.bus().publish(
                    Event::new(EventKind::AllocationFailed)
                        .with_task(Self::NAME)
                        .with_reason(e.to_string()),
                );
                return ProduceOutcome::AllocationFailed;
            }
        };
        self.next_seq.store(seq + 1, Ordering::Relaxed);
        let produced = *item;

        match self.shared.channel().try_send(item) {
            Ok(()) => {
                self.shared.liveness().signal(Liveness::PRODUCER);
                self.publish(EventKind::ItemSent, produced);
                ProduceOutcome::Sent(produced)
            }
            Err(TrySendError::Full(item)) => {
                drop(item);
                self.publish(EventKind::ItemDropped, produced);
                ProduceOutcome::Dropped(produced)
            }
        }
    }

    fn publish(&self, kind: EventKind, item: Item) {
        self.shared.bus().publish(
            Event::new(kind)
                .with_task(Self::NAME)
                .with_item(item.id, item.value),
        );
    }
}

#[async_trait]
impl Task for Generator {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        loop {
            self.cycle();
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
    use crate::pipeline::testing::{bus, drain, kinds};
    use crate::runtime::Watchdog;

    const TICK: Duration = Duration::from_secs(1);

    fn generator(pool: usize) -> (Generator, Shared, tokio::sync::broadcast::Receiver<Event>) {
        let (bus, rx) = bus();
        let shared = Shared::new(pool, bus);
        let wd = Watchdog::new(TICK * 5);
        let g = Generator::new(shared.clone(), wd.register(Generator::NAME), TICK);
        (g, shared, rx)
    }

    #[tokio::test]
    async fn second_send_before_receive_is_dropped() {
        let (g, shared, mut rx) = generator(4);

        assert_eq!(g.cycle(), ProduceOutcome::Sent(Item::new(1)));
        assert_eq!(g.cycle(), ProduceOutcome::Dropped(Item::new(2)));
        assert_eq!(shared.pool().in_use(), 1);

        let events = drain(&mut rx);
        assert_eq!(kinds(&events), vec![EventKind::ItemSent, EventKind::ItemDropped]);
        assert_eq!(events[1].item_id, Some(2));
        assert_eq!(events[1].item_value, Some(2));

        let got = shared.channel().receive(TICK).await.unwrap();
        assert_eq!(*got, Item::new(1));
    }

    #[tokio::test]
    async fn only_successful_sends_signal_producer() {
        let (g, shared, _rx) = generator(4);
        g.cycle();
        g.cycle();

        let seen = shared.liveness().observe_and_clear(Liveness::all(), TICK).await;
        assert_eq!(seen, Liveness::PRODUCER);

        g.cycle();
        let seen = shared.liveness().observe_and_clear(Liveness::all(), Duration::from_millis(1)).await;
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn ids_strictly_increase_across_drops() {
        let (g, shared, _rx) = generator(4);
        let mut ids = Vec::new();
        for round in 0..20 {
            match g.cycle() {
                ProduceOutcome::Sent(it) | ProduceOutcome::Dropped(it) => ids.push(it.id),
                ProduceOutcome::AllocationFailed => unreachable!(),
            }
            if round % 3 == 0 {
                let _ = shared.channel().receive(Duration::from_millis(1)).await;
            }
        }
        assert_eq!(ids, (1..=20).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn allocation_failure_consumes_no_id() {
        let (g, shared, mut rx) = generator(1);
        assert_eq!(g.cycle(), ProduceOutcome::Sent(Item::new(1)));

        // The only slot sits in the channel.
        assert_eq!(g.cycle(), ProduceOutcome::AllocationFailed);
        let events = drain(&mut rx);
        assert_eq!(events.last().map(|e| e.kind), Some(EventKind::AllocationFailed));

        drop(shared.channel().receive(TICK).await.unwrap());
        assert_eq!(g.cycle(), ProduceOutcome::Sent(Item::new(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn loop_paces_and_stops_on_cancel() {
        let (g, _shared, mut rx) = generator(4);
        let g = std::sync::Arc::new(g);
        let token = CancellationToken::new();

        let handle = {
            let g = std::sync::Arc::clone(&g);
            let token = token.clone();
            tokio::spawn(async move { g.run(token).await })
        };
        time::sleep(TICK * 3 + Duration::from_millis(500)).await;
        token.cancel();

        assert!(matches!(handle.await.unwrap(), Err(TaskError::Canceled)));
        let produced = drain(&mut rx)
            .iter()
            .filter(|e| matches!(e.kind, EventKind::ItemSent | EventKind::ItemDropped))
            .count();
        assert_eq!(produced, 4);
    }
}
