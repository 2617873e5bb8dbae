//! # Stdout logging subscriber.
//!
//! [`LogWriter`] prints one line per event, tagged with the event's
//! [`Category`](crate::events::Category):
//!
//! ```text
//! [handoff] [TX] generator sent id=1 value=1
//! [handoff] [FILA] generator dropped id=2 value=2
//! [handoff] [RX] receiver received id=1 value=1
//! [handoff] [FILA] receiver timeout attempt=3
//! [handoff] [ALERTA] receiver escalation attempt=3
//! [handoff] [RECUPERAÇÃO] receiver channel reset attempt=5 (channel empty)
//! [handoff] [SUP] fully healthy
//! [handoff] [FALHA] failure: silence from both
//! ```
//!
//! The tag and the values are stable; the wording is not.

use std::fmt::Write as _;

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Stdout logging subscriber.
pub struct LogWriter {
    prefix: String,
}

impl LogWriter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Formats one event as a log line (without trailing newline).
    ///
    /// # Example
    /// ```
    /// use handoff::{Event, EventKind, LogWriter};
    ///
    /// let line = LogWriter::new("[dev]").render(
    ///     &Event::new(EventKind::ItemSent).with_task("generator").with_item(7, 7),
    /// );
    /// assert_eq!(line, "[dev] [TX] generator sent id=7 value=7");
    /// ```
    pub fn render(&self, e: &Event) -> String {
        let mut out = format!("{} [{}]", self.prefix, e.category());
        match &e.task {
            Some(task) if e.kind != EventKind::HealthReport => {
                let _ = write!(out, " {task}");
            }
            _ => {}
        }

        let _ = match e.kind {
            EventKind::ItemSent => write!(out, " sent"),
            EventKind::ItemDropped => write!(out, " dropped"),
            EventKind::AllocationFailed => write!(out, " allocation failed"),
            EventKind::ItemReceived => write!(out, " received"),
            EventKind::ItemInvalid => write!(out, " invalid item"),
            EventKind::ReceiveTimeout => write!(out, " timeout"),
            EventKind::ReceiveEscalated => write!(out, " escalation"),
            EventKind::ChannelRecovered => write!(out, " channel reset"),
            EventKind::HealthReport => Ok(()),
            EventKind::TaskStarting => write!(out, " starting"),
            EventKind::TaskStopped => write!(out, " stopped"),
            EventKind::TaskFailed => write!(out, " failed"),
            EventKind::BackoffScheduled => write!(out, " backoff"),
            EventKind::ActorExhausted => write!(out, " exhausted"),
            EventKind::ResourceCreationFailed => write!(out, " startup failed"),
            EventKind::WatchdogExpired => write!(out, " watchdog expired"),
            EventKind::ShutdownRequested => write!(out, " shutdown requested"),
            EventKind::AllStoppedWithin => write!(out, " all tasks stopped within grace"),
            EventKind::GraceExceeded => write!(out, " grace exceeded"),
            EventKind::SubscriberOverflow => write!(out, " dropped event"),
            EventKind::SubscriberPanicked => write!(out, " panicked"),
        };

        if let (Some(id), Some(value)) = (e.item_id, e.item_value) {
            let _ = write!(out, " id={id} value={value}");
        }
        if let Some(attempt) = e.attempt {
            let _ = write!(out, " attempt={attempt}");
        }
        if let Some(ms) = e.delay_ms {
            let _ = write!(out, " delay={ms}ms");
        }
        match (e.kind, &e.reason) {
            (EventKind::HealthReport, Some(reason)) => {
                let _ = write!(out, " {reason}");
            }
            (EventKind::HealthReport, None) => {
                if let Some(h) = e.health {
                    let _ = write!(out, " {h}");
                }
            }
            (_, Some(reason)) => {
                let _ = write!(out, " ({reason})");
            }
            (_, None) => {}
        }
        out
    }
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::new("[handoff]")
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", self.render(e));
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Health;

    fn render(ev: Event) -> String {
        LogWriter::new("[t]").render(&ev)
    }

    #[test]
    fn item_lines_carry_tag_and_values() {
        assert_eq!(
            render(Event::new(EventKind::ItemDropped).with_task("generator").with_item(2, 2)),
            "[t] [FILA] generator dropped id=2 value=2"
        );
        assert_eq!(
            render(Event::new(EventKind::ReceiveEscalated).with_task("receiver").with_attempt(3)),
            "[t] [ALERTA] receiver escalation attempt=3"
        );
    }

    #[test]
    fn health_lines() {
        let ok = Event::new(EventKind::HealthReport)
            .with_task("supervisor")
            .with_health(Health::Healthy);
        assert_eq!(render(ok), "[t] [SUP] fully healthy");

        let silent = Event::new(EventKind::HealthReport)
            .with_health(Health::Silent)
            .with_reason(Health::Silent.to_string());
        assert_eq!(render(silent), "[t] [FALHA] failure: silence from both");
    }

    #[test]
    fn reasons_are_parenthesized() {
        let line = render(
            Event::new(EventKind::ResourceCreationFailed)
                .with_reason("failed to create item pool: capacity must be at least 1"),
        );
        assert_eq!(
            line,
            "[t] [ERRO] startup failed (failed to create item pool: capacity must be at least 1)"
        );
    }
}
