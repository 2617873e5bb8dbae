//! # Backoff policy for restarting tasks.
//!
//! The delay before restart `n` (0-indexed) is `first × factor^n`, clamped to
//! `max`, then jittered. The base is derived from the restart count alone, so
//! jitter never feeds back into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use handoff::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_millis(800),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(100));
//! assert_eq!(backoff.next(2), Duration::from_millis(400));
//! assert_eq!(backoff.next(9), Duration::from_millis(800));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Restart backoff policy.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay before the first restart.
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Jitter applied after clamping.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `first = 100ms`, `factor = 2.0`, `max = 1s`, no jitter.
    ///
    /// The cap stays well below the default five second watchdog timeout.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(1),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay before restart number `restart` (0-indexed).
    pub fn next(&self, restart: u32) -> Duration {
        let exp = restart.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(factor: f64) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(1),
            factor,
            jitter: JitterPolicy::None,
        }
    }

    #[test]
    fn doubles_until_cap() {
        let p = policy(2.0);
        assert_eq!(p.next(0), Duration::from_millis(100));
        assert_eq!(p.next(1), Duration::from_millis(200));
        assert_eq!(p.next(3), Duration::from_millis(800));
        assert_eq!(p.next(4), Duration::from_secs(1));
    }

    #[test]
    fn constant_factor() {
        let p = policy(1.0);
        for n in 0..8 {
            assert_eq!(p.next(n), Duration::from_millis(100));
        }
    }

    #[test]
    fn first_above_max_is_clamped() {
        let p = BackoffPolicy {
            first: Duration::from_secs(3),
            ..policy(2.0)
        };
        assert_eq!(p.next(0), Duration::from_secs(1));
    }

    #[test]
    fn overflow_clamps_to_max() {
        assert_eq!(policy(2.0).next(u32::MAX), Duration::from_secs(1));
    }

    #[test]
    fn default_stays_under_watchdog() {
        let p = BackoffPolicy::default();
        assert!(p.next(u32::MAX) < Duration::from_secs(5));
    }
}
