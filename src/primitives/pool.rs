//! # Bounded item pool.
//!
//! The device has a fixed budget of item slots. [`ItemPool::alloc`] claims one
//! and wraps the value in a [`Pooled`] handle; dropping the handle gives the
//! slot back. Each slot is therefore released exactly once, whichever task
//! ends up owning the handle (generator, channel, receiver).
//!
//! Allocation fails with [`AllocError`] when every slot is claimed; that is the
//! only allocation failure the pipeline ever sees.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::AllocError;

struct PoolInner {
    capacity: usize,
    in_use: AtomicUsize,
}

/// Fixed-capacity slot budget shared by all pipeline tasks.
#[derive(Clone)]
pub struct ItemPool {
    inner: Arc<PoolInner>,
}

impl ItemPool {
    /// Creates a pool with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                capacity,
                in_use: AtomicUsize::new(0),
            }),
        }
    }

    /// Claims a slot for `value`.
    pub fn alloc<T>(&self, value: T) -> Result<Pooled<T>, AllocError> {
        let cap = self.inner.capacity;
        self.inner
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < cap).then_some(n + 1))
            .map_err(|_| AllocError { capacity: cap })?;

        Ok(Pooled {
            value,
            pool: Arc::clone(&self.inner),
        })
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Slots currently claimed.
    pub fn in_use(&self) -> usize {
        self.inner.in_use.load(Ordering::Acquire)
    }
}

impl fmt::Debug for ItemPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemPool")
            .field("capacity", &self.capacity())
            .field("in_use", &self.in_use())
            .finish()
    }
}

/// A value occupying one pool slot; the slot is released on drop.
pub struct Pooled<T> {
    value: T,
    pool: Arc<PoolInner>,
}

impl<T: Clone> Pooled<T> {
    /// Copies the value into a second slot of the same pool.
    pub fn duplicate(&self) -> Result<Pooled<T>, AllocError> {
        ItemPool {
            inner: Arc::clone(&self.pool),
        }
        .alloc(self.value.clone())
    }
}

impl<T> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl<T> Drop for Pooled<T> {
    fn drop(&mut self) {
        self.pool.in_use.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_returned_on_drop() {
        let pool = ItemPool::new(2);
        let a = pool.alloc(1u64).unwrap();
        let b = pool.alloc(2u64).unwrap();
        assert_eq!(pool.in_use(), 2);
        assert_eq!(pool.alloc(3u64).unwrap_err(), AllocError { capacity: 2 });

        drop(a);
        assert_eq!(pool.in_use(), 1);
        drop(b);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn duplicate_claims_its_own_slot() {
        let pool = ItemPool::new(2);
        let original = pool.alloc(5u64).unwrap();
        let copy = original.duplicate().unwrap();
        assert_eq!(*copy, 5);
        assert_eq!(pool.in_use(), 2);
        assert!(original.duplicate().is_err());

        drop(copy);
        drop(original);
        assert_eq!(pool.in_use(), 0);
    }
}
