//! # Two-flag liveness signal.
//!
//! Workers set their flag after making progress; the observer waits for any
//! flag in a mask and clears what it saw in the same atomic step:
//!
//! ```text
//! generator ── signal(PRODUCER) ──┐
//!                                 ├──► bits ──► observe_and_clear(mask, window) ──► supervisor
//! receiver  ── signal(CONSUMER) ──┘
//! ```
//!
//! ## Rules
//! - `signal` is an idempotent OR; it never blocks and never touches the other flag.
//! - `observe_and_clear` returns `bits & mask` and clears exactly those bits with
//!   one `fetch_and`; a flag is reported by at most one observation.
//! - A flag set before the window closes wakes the observer; one set after stays
//!   for the next window.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use bitflags::bitflags;
use tokio::sync::Notify;
use tokio::time::{self, Instant};

bitflags! {
    /// Progress flags carried by [`LivenessSignal`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Liveness: u8 {
        /// The generator handed an item to the channel.
        const PRODUCER = 1 << 0;
        /// The receiver took an item from the channel.
        const CONSUMER = 1 << 1;
    }
}

/// Shared progress flags with a blocking read-and-clear observer.
pub struct LivenessSignal {
    bits: AtomicU8,
    changed: Notify,
}

impl LivenessSignal {
    /// Creates a signal with both flags cleared.
    pub fn new() -> Self {
        Self {
            bits: AtomicU8::new(0),
            changed: Notify::new(),
        }
    }

    /// Sets `flag`.
    pub fn signal(&self, flag: Liveness) {
        self.bits.fetch_or(flag.bits(), Ordering::AcqRel);
        self.changed.notify_one();
    }

    /// Waits up to `timeout` for any flag in `mask`, then clears and returns the
    /// flags of `mask` that were set. Returns an empty set on timeout.
    pub async fn observe_and_clear(&self, mask: Liveness, timeout: Duration) -> Liveness {
        let deadline = Instant::now() + timeout;
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let prev = self.bits.fetch_and(!mask.bits(), Ordering::AcqRel);
            let seen = Liveness::from_bits_truncate(prev) & mask;
            if !seen.is_empty() {
                return seen;
            }
            if time::timeout_at(deadline, notified).await.is_err() {
                return Liveness::empty();
            }
        }
    }
}

impl Default for LivenessSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const WINDOW: Duration = Duration::from_secs(2);

    #[tokio::test(start_paused = true)]
    async fn returns_flags_set_before_the_call() {
        let sig = LivenessSignal::new();
        sig.signal(Liveness::PRODUCER);
        sig.signal(Liveness::CONSUMER);

        assert_eq!(sig.observe_and_clear(Liveness::all(), WINDOW).await, Liveness::all());
    }

    #[tokio::test(start_paused = true)]
    async fn cleared_flags_are_not_reported_twice() {
        let sig = LivenessSignal::new();
        sig.signal(Liveness::PRODUCER);
        sig.signal(Liveness::PRODUCER);

        assert_eq!(sig.observe_and_clear(Liveness::all(), WINDOW).await, Liveness::PRODUCER);
        assert_eq!(sig.observe_and_clear(Liveness::all(), WINDOW).await, Liveness::empty());
    }

    #[tokio::test(start_paused = true)]
    async fn only_masked_bits_are_cleared() {
        let sig = LivenessSignal::new();
        sig.signal(Liveness::all());

        assert_eq!(sig.observe_and_clear(Liveness::CONSUMER, WINDOW).await, Liveness::CONSUMER);
        assert_eq!(sig.observe_and_clear(Liveness::all(), WINDOW).await, Liveness::PRODUCER);
    }

    #[tokio::test(start_paused = true)]
    async fn wakes_on_signal_inside_window() {
        let sig = Arc::new(LivenessSignal::new());
        let observer = {
            let sig = Arc::clone(&sig);
            tokio::spawn(async move {
                let start = Instant::now();
                let seen = sig.observe_and_clear(Liveness::all(), WINDOW).await;
                (seen, start.elapsed())
            })
        };

        time::sleep(Duration::from_millis(500)).await;
        sig.signal(Liveness::CONSUMER);

        let (seen, elapsed) = observer.await.unwrap();
        assert_eq!(seen, Liveness::CONSUMER);
        assert!(elapsed < WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_window_times_out_empty() {
        let sig = LivenessSignal::new();
        let start = Instant::now();

        assert!(sig.observe_and_clear(Liveness::all(), WINDOW).await.is_empty());
        assert!(start.elapsed() >= WINDOW);
    }
}
