//! # Receiver: the consumer loop.
//!
//! ```text
//! receive(receive_timeout)
//!   ├─ item ──► duplicate into a working copy
//!   │            ├─ copy ok   ──► validate copy ──► ItemReceived | ItemInvalid, drop copy
//!   │            └─ no slot   ──► AllocationFailed
//!   │           drop original, signal(CONSUMER), timeouts = 0
//!   └─ timeout ──► timeouts += 1, ReceiveTimeout{attempt}
//!                   ├─ timeouts == escalate_after ──► ReceiveEscalated
//!                   └─ timeouts >= recover_after  ──► channel.reset(), ChannelRecovered, timeouts = 0
//! report_liveness
//! ```
//!
//! Consumer liveness is signaled once per received item, whatever happened to
//! the working copy, and never on a timeout or a recovery.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{ItemError, TaskError};
use crate::events::{Event, EventKind};
use crate::pipeline::{Item, Shared};
use crate::primitives::Liveness;
use crate::runtime::WatchdogHandle;
use crate::tasks::Task;

/// Consecutive-timeout bookkeeping, local to one run of the receiver loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    /// Consecutive receive timeouts.
    pub timeouts: u32,
    /// Last id that passed validation.
    pub last_id: Option<u64>,
}

/// Result of one receiver cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Item received and validated.
    Consumed(Item),
    /// Item received but rejected by validation.
    Invalid(Item, ItemError),
    /// Item received; no slot for the working copy.
    CopyFailed(Item),
    /// Window closed without an item.
    TimedOut { attempt: u32 },
    /// Window closed and the escalation threshold was reached.
    Escalated { attempt: u32 },
    /// Window closed and the channel was reset.
    Recovered { attempt: u32, discarded: bool },
}

/// Consumer loop.
pub struct Receiver {
    shared: Shared,
    watchdog: WatchdogHandle,
    timeout: Duration,
    escalate_after: u32,
    recover_after: u32,
}

impl Receiver {
    pub const NAME: &'static str = "receiver";

    pub fn new(
        shared: Shared,
        watchdog: WatchdogHandle,
        timeout: Duration,
        escalate_after: u32,
        recover_after: u32,
    ) -> Self {
        Self {
            shared,
            watchdog,
            timeout,
            escalate_after,
            recover_after,
        }
    }

    /// Waits for one item (or the end of the window) and handles it.
    pub async fn cycle(&self, state: &mut RetryState) -> ReceiveOutcome {
        match self.shared.channel().receive(self.timeout).await {
            Ok(original) => {
                let item = *original;
                let outcome = match original.duplicate() {
                    Ok(copy) => {
                        let checked = copy.validate(state.last_id);
                        drop(copy);
                        match checked {
                            Ok(()) => {
                                state.last_id = Some(item.id);
                                self.publish_item(EventKind::ItemReceived, item, None);
                                ReceiveOutcome::Consumed(item)
                            }
                            Err(e) => {
                                self.publish_item(EventKind::ItemInvalid, item, Some(e.to_string()));
                                ReceiveOutcome::Invalid(item, e)
                            }
                        }
                    }
                    Err(e) => {
                        self.shared.bus().publish(
                            Event::new(EventKind::AllocationFailed)
                                .with_task(Self::NAME)
                                .with_item(item.id, item.value)
                                .with_reason(e.to_string()),
                        );
                        ReceiveOutcome::CopyFailed(item)
                    }
                };
                drop(original);

                self.shared.liveness().signal(Liveness::CONSUMER);
                state.timeouts = 0;
                outcome
            }
            Err(_) => self.on_timeout(state),
        }
    }

    fn on_timeout(&self, state: &mut RetryState) -> ReceiveOutcome {
        state.timeouts = state.timeouts.saturating_add(1);
        let attempt = state.timeouts;
        self.publish_attempt(EventKind::ReceiveTimeout, attempt);

        let mut outcome = ReceiveOutcome::TimedOut { attempt };
        if attempt == self.escalate_after {
            self.publish_attempt(EventKind::ReceiveEscalated, attempt);
            outcome = ReceiveOutcome::Escalated { attempt };
        }
        if attempt >= self.recover_after {
            let discarded = self.shared.channel().reset();
            self.shared.bus().publish(
                Event::new(EventKind::ChannelRecovered)
                    .with_task(Self::NAME)
                    .with_attempt(attempt)
                    .with_reason(if discarded { "item discarded" } else { "channel empty" }),
            );
            state.timeouts = 0;
            outcome = ReceiveOutcome::Recovered { attempt, discarded };
        }
        outcome
    }

    fn publish_item(&self, kind: EventKind, item: Item, reason: Option<String>) {
        let mut ev = Event::new(kind)
            .with_task(Self::NAME)
            .with_item(item.id, item.value);
        if let Some(reason) = reason {
            ev = ev.with_reason(reason);
        }
        self.shared.bus().publish(ev);
    }

    fn publish_attempt(&self, kind: EventKind, attempt: u32) {
        self.shared.bus().publish(
            Event::new(kind)
                .with_task(Self::NAME)
                .with_attempt(attempt),
        );
    }
}

#[async_trait]
impl Task for Receiver {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        let mut state = RetryState::default();
        loop {
            tokio::select! {
                _ = self.cycle(&mut state) => {}
                _ = ctx.cancelled() => return Err(TaskError::Canceled),
            }
            self.watchdog.report_liveness();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{bus, drain, kinds};
    use crate::runtime::Watchdog;
    use tokio::sync::broadcast;

    const TICK: Duration = Duration::from_secs(1);

    fn receiver(pool: usize) -> (Receiver, Shared, broadcast::Receiver<Event>) {
        let (bus, rx) = bus();
        let shared = Shared::new(pool, bus);
        let wd = Watchdog::new(TICK * 5);
        let r = Receiver::new(shared.clone(), wd.register(Receiver::NAME), TICK, 3, 5);
        (r, shared, rx)
    }

    fn send(shared: &Shared, item: Item) {
        let pooled = shared.pool().alloc(item).unwrap();
        shared.channel().try_send(pooled).unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn success_consumes_and_releases_both_copies() {
        let (r, shared, mut rx) = receiver(4);
        let mut state = RetryState { timeouts: 2, last_id: None };
        send(&shared, Item::new(1));

        assert_eq!(r.cycle(&mut state).await, ReceiveOutcome::Consumed(Item::new(1)));
        assert_eq!(state, RetryState { timeouts: 0, last_id: Some(1) });
        assert_eq!(shared.pool().in_use(), 0);

        let events = drain(&mut rx);
        assert_eq!(kinds(&events), vec![EventKind::ItemReceived]);
        assert_eq!(events[0].item_id, Some(1));

        let seen = shared.liveness().observe_and_clear(Liveness::all(), TICK).await;
        assert_eq!(seen, Liveness::CONSUMER);
    }

    #[tokio::test(start_paused = true)]
    async fn escalates_on_third_and_recovers_on_fifth_timeout() {
        let (r, shared, mut rx) = receiver(4);
        let mut state = RetryState::default();

        let mut outcomes = Vec::new();
        for _ in 0..6 {
            outcomes.push(r.cycle(&mut state).await);
        }
        assert_eq!(
            outcomes,
            vec![
                ReceiveOutcome::TimedOut { attempt: 1 },
                ReceiveOutcome::TimedOut { attempt: 2 },
                ReceiveOutcome::Escalated { attempt: 3 },
                ReceiveOutcome::TimedOut { attempt: 4 },
                ReceiveOutcome::Recovered { attempt: 5, discarded: false },
                ReceiveOutcome::TimedOut { attempt: 1 },
            ]
        );
        assert_eq!(state.timeouts, 1);

        let events = drain(&mut rx);
        let escalations = events.iter().filter(|e| e.kind == EventKind::ReceiveEscalated).count();
        let recoveries = events.iter().filter(|e| e.kind == EventKind::ChannelRecovered).count();
        assert_eq!((escalations, recoveries), (1, 1));

        let seen = shared.liveness().observe_and_clear(Liveness::all(), TICK).await;
        assert!(seen.is_empty(), "timeouts must not signal consumer liveness");
    }

    #[tokio::test(start_paused = true)]
    async fn success_resets_counter_between_timeouts() {
        let (r, shared, _rx) = receiver(4);
        let mut state = RetryState::default();

        r.cycle(&mut state).await;
        r.cycle(&mut state).await;
        send(&shared, Item::new(1));
        r.cycle(&mut state).await;
        assert_eq!(state.timeouts, 0);

        r.cycle(&mut state).await;
        r.cycle(&mut state).await;
        assert_eq!(r.cycle(&mut state).await, ReceiveOutcome::Escalated { attempt: 3 });
    }

    #[tokio::test(start_paused = true)]
    async fn copy_failure_still_consumes_original() {
        let (r, shared, mut rx) = receiver(1);
        let mut state = RetryState::default();
        send(&shared, Item::new(1));

        assert_eq!(r.cycle(&mut state).await, ReceiveOutcome::CopyFailed(Item::new(1)));
        assert_eq!(shared.pool().in_use(), 0);
        assert_eq!(kinds(&drain(&mut rx)), vec![EventKind::AllocationFailed]);

        let seen = shared.liveness().observe_and_clear(Liveness::all(), TICK).await;
        assert_eq!(seen, Liveness::CONSUMER);
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_order_item_is_rejected_but_consumed() {
        let (r, shared, mut rx) = receiver(4);
        let mut state = RetryState { timeouts: 0, last_id: Some(5) };
        send(&shared, Item::new(4));

        assert_eq!(
            r.cycle(&mut state).await,
            ReceiveOutcome::Invalid(Item::new(4), ItemError::OutOfOrder { id: 4, last: 5 })
        );
        assert_eq!(state.last_id, Some(5));
        assert_eq!(shared.pool().in_use(), 0);
        assert_eq!(kinds(&drain(&mut rx)), vec![EventKind::ItemInvalid]);
    }
}
