//! # Single-slot handoff channel.
//!
//! [`Channel`] moves ownership of one value at a time from a producer to a
//! consumer. Capacity is fixed at one, so a full channel is the normal state
//! under load and the producer sees it immediately:
//!
//! ```text
//! try_send(v) ── slot empty ──► slot = v, wake receiver ──► Ok(())
//!             └─ slot full  ──► Err(Full(v))  (caller keeps v, slot untouched)
//!
//! receive(t)  ── slot full  ──► take ──► Ok(v)
//!             └─ slot empty ──► park on Notify until send or deadline
//!                                   ├─ woken, slot full ──► Ok(v)
//!                                   ├─ woken, slot empty (reset raced) ──► park again
//!                                   └─ deadline ──► Err(RecvTimeout)
//!
//! reset()     ── drop whatever is in the slot
//! ```
//!
//! ## Rules
//! - Ownership moves exactly once per successful `try_send` / `receive`.
//! - The slot lock is never held across an await.
//! - The wake permit left by `Notify::notify_one` covers a send that lands
//!   before the receiver parks; the slot is re-checked after every wake.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{self, Instant};

use crate::error::{RecvTimeout, TrySendError};

/// Bounded (capacity 1) ownership handoff.
pub struct Channel<T> {
    slot: Mutex<Option<T>>,
    ready: Notify,
}

impl<T> Channel<T> {
    /// Creates an empty channel.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            ready: Notify::new(),
        }
    }

    /// Hands `item` over if the slot is empty; never blocks.
    ///
    /// On `Err(Full(item))` the slot is untouched and the caller owns `item` again.
    pub fn try_send(&self, item: T) -> Result<(), TrySendError<T>> {
        {
            let mut slot = self.lock();
            if slot.is_some() {
                return Err(TrySendError::Full(item));
            }
            *slot = Some(item);
        }
        self.ready.notify_one();
        Ok(())
    }

    /// Waits up to `timeout` for an item and takes ownership of it.
    ///
    /// A timeout has no side effects.
    pub async fn receive(&self, timeout: Duration) -> Result<T, RecvTimeout> {
        let deadline = Instant::now() + timeout;
        loop {
            let notified = self.ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(item) = self.lock().take() {
                return Ok(item);
            }
            if time::timeout_at(deadline, notified).await.is_err() {
                return Err(RecvTimeout { timeout });
            }
        }
    }

    /// Empties the slot, destroying any held item.
    ///
    /// Returns `true` if an item was discarded. A receiver already waiting keeps
    /// waiting as if nothing had been sent.
    pub fn reset(&self) -> bool {
        let discarded = self.lock().take();
        discarded.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}
