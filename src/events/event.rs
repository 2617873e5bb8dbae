//! # Events emitted by the pipeline loops and the device runtime.
//!
//! [`EventKind`] covers three groups:
//! - **Pipeline events**: one per outcome of a generator, receiver or supervisor cycle
//! - **Task events**: actor lifecycle (starting, failed, backoff, exhausted)
//! - **Device events**: startup failure, watchdog expiry, shutdown
//!
//! Each kind maps to a log [`Category`]; the category and the payload values
//! (item id/value, attempt count, health) are the contract, wording is not.
//!
//! ## Example
//! ```rust
//! use handoff::{Category, Event, EventKind};
//!
//! let ev = Event::new(EventKind::ItemDropped)
//!     .with_task("generator")
//!     .with_item(2, 2);
//!
//! assert_eq!(ev.category(), Category::Queue);
//! assert_eq!(ev.item_id, Some(2));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::pipeline::Health;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Pipeline: generator ===
    /// Item handed to the channel.
    ///
    /// Sets: `task`, `item_id`, `item_value`
    ItemSent,

    /// Channel was full; the item was destroyed.
    ///
    /// Sets: `task`, `item_id`, `item_value`
    ItemDropped,

    /// The item pool had no free slot.
    ///
    /// Sets: `task`, `reason`
    AllocationFailed,

    // === Pipeline: receiver ===
    /// Item received and validated.
    ///
    /// Sets: `task`, `item_id`, `item_value`
    ItemReceived,

    /// Item received but failed validation.
    ///
    /// Sets: `task`, `item_id`, `item_value`, `reason`
    ItemInvalid,

    /// Receive window closed without an item.
    ///
    /// Sets: `task`, `attempt` (consecutive timeouts so far)
    ReceiveTimeout,

    /// Consecutive timeouts reached the escalation threshold.
    ///
    /// Sets: `task`, `attempt`
    ReceiveEscalated,

    /// Consecutive timeouts reached the recovery threshold; the channel was reset.
    ///
    /// Sets: `task`, `attempt`, `reason` (whether an item was discarded)
    ChannelRecovered,

    // === Pipeline: supervisor ===
    /// Result of one observation window.
    ///
    /// Sets: `task`, `health`
    HealthReport,

    // === Task lifecycle ===
    /// Actor is starting a run of its task loop.
    ///
    /// Sets: `task`, `attempt` (1-based run counter)
    TaskStarting,

    /// Task loop returned cleanly or was cancelled.
    ///
    /// Sets: `task`, `attempt`
    TaskStopped,

    /// Task loop returned an error or panicked.
    ///
    /// Sets: `task`, `attempt`, `reason`
    TaskFailed,

    /// Restart scheduled after a failure.
    ///
    /// Sets: `task`, `attempt`, `delay_ms`, `reason`
    BackoffScheduled,

    /// Actor will not restart its task any more.
    ///
    /// Sets: `task`, `attempt`, `reason` (optional)
    ActorExhausted,

    // === Device ===
    /// Shared primitives could not be created; the device must restart.
    ///
    /// Sets: `reason`
    ResourceCreationFailed,

    /// A registered task missed its watchdog deadline; the device must restart.
    ///
    /// Sets: `task`, `reason`
    WatchdogExpired,

    /// Shutdown requested (OS signal observed).
    ShutdownRequested,

    /// All tasks stopped within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some tasks did not stop in time.
    GraceExceeded,

    // === Subscribers ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `task` (subscriber name), `reason`
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `task` (subscriber name), `reason`
    SubscriberPanicked,
}

/// Log channel tag carried by every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `TX`: item sent.
    Tx,
    /// `RX`: item received.
    Rx,
    /// `FILA`: queue condition (drop on full, receive timeout).
    Queue,
    /// `SUP`: supervisor health report.
    Sup,
    /// `ALERTA`: escalation warning.
    Alert,
    /// `FALHA`: failure report (silence from both, watchdog expiry).
    Failure,
    /// `RECUPERAÇÃO`: recovery action taken.
    Recovery,
    /// `ERRO`: error (allocation, validation, resource creation).
    Error,
    /// `TASK`: actor lifecycle.
    Task,
    /// `SYS`: device and subscriber housekeeping.
    System,
}

impl Category {
    /// The tag written in log lines.
    pub fn tag(self) -> &'static str {
        match self {
            Category::Tx => "TX",
            Category::Rx => "RX",
            Category::Queue => "FILA",
            Category::Sup => "SUP",
            Category::Alert => "ALERTA",
            Category::Failure => "FALHA",
            Category::Recovery => "RECUPERAÇÃO",
            Category::Error => "ERRO",
            Category::Task => "TASK",
            Category::System => "SYS",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the task (or subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Item id, for item events.
    pub item_id: Option<u64>,
    /// Item value, for item events.
    pub item_value: Option<u64>,
    /// Attempt or run counter (starting from 1).
    pub attempt: Option<u32>,
    /// Health classification, for [`EventKind::HealthReport`].
    pub health: Option<Health>,
    /// Restart delay in milliseconds.
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            item_id: None,
            item_value: None,
            attempt: None,
            health: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches an item's id and value.
    #[inline]
    pub fn with_item(mut self, id: u64, value: u64) -> Self {
        self.item_id = Some(id);
        self.item_value = Some(value);
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a health classification.
    #[inline]
    pub fn with_health(mut self, health: Health) -> Self {
        self.health = Some(health);
        self
    }

    /// Attaches a restart delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u32::MAX)) as u32);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Log channel of this event.
    pub fn category(&self) -> Category {
        match self.kind {
            EventKind::ItemSent => Category::Tx,
            EventKind::ItemReceived => Category::Rx,
            EventKind::ItemDropped | EventKind::ReceiveTimeout => Category::Queue,
            EventKind::ReceiveEscalated => Category::Alert,
            EventKind::ChannelRecovered => Category::Recovery,
            EventKind::AllocationFailed
            | EventKind::ItemInvalid
            | EventKind::ResourceCreationFailed => Category::Error,
            EventKind::HealthReport => match self.health {
                Some(Health::Silent) | None => Category::Failure,
                Some(_) => Category::Sup,
            },
            EventKind::WatchdogExpired => Category::Failure,
            EventKind::TaskStarting
            | EventKind::TaskStopped
            | EventKind::TaskFailed
            | EventKind::BackoffScheduled
            | EventKind::ActorExhausted => Category::Task,
            EventKind::ShutdownRequested
            | EventKind::AllStoppedWithin
            | EventKind::GraceExceeded
            | EventKind::SubscriberOverflow
            | EventKind::SubscriberPanicked => Category::System,
        }
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::new(EventKind::ItemSent);
        let b = Event::new(EventKind::ItemSent);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn pipeline_categories() {
        let cases = [
            (EventKind::ItemSent, "TX"),
            (EventKind::ItemReceived, "RX"),
            (EventKind::ItemDropped, "FILA"),
            (EventKind::ReceiveTimeout, "FILA"),
            (EventKind::ReceiveEscalated, "ALERTA"),
            (EventKind::ChannelRecovered, "RECUPERAÇÃO"),
            (EventKind::AllocationFailed, "ERRO"),
            (EventKind::WatchdogExpired, "FALHA"),
        ];
        for (kind, tag) in cases {
            assert_eq!(Event::new(kind).category().tag(), tag, "{kind:?}");
        }
    }

    #[test]
    fn health_report_category_follows_health() {
        let ok = Event::new(EventKind::HealthReport).with_health(Health::ProducerOnly);
        let silent = Event::new(EventKind::HealthReport).with_health(Health::Silent);
        assert_eq!(ok.category(), Category::Sup);
        assert_eq!(silent.category(), Category::Failure);
    }

    #[test]
    fn delay_saturates() {
        let ev = Event::new(EventKind::BackoffScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }
}
