//! # Device configuration.
//!
//! Provides [`Config`] centralized settings for the pipeline and its runtime.
//!
//! All periods are derived from one **time unit** (`1s` by default):
//!
//! | field               | default  | meaning                                     |
//! |---------------------|----------|---------------------------------------------|
//! | `produce_interval`  | 1 unit   | generator pause between cycles              |
//! | `receive_timeout`   | 1 unit   | receiver wait per cycle                     |
//! | `observe_window`    | 2 units  | supervisor wait for any liveness flag       |
//! | `supervise_interval`| 2 units  | supervisor pause between cycles             |
//! | `watchdog_timeout`  | 5 units  | max silence before the device restarts      |
//!
//! Use [`Config::with_tick`] to rescale every period at once (tests, fast demos).
//!
//! ## Sentinel values
//! - `grace = 0s` → do not wait for tasks on shutdown

use std::time::Duration;

use crate::error::RuntimeError;
use crate::policies::{BackoffPolicy, RestartPolicy};

/// Global configuration for the device.
///
/// ## Notes
/// All fields are public. [`Config::validate`] is called by the device builder;
/// a rejected config is treated as a resource-creation failure.
#[derive(Clone, Debug)]
pub struct Config {
    /// Generator pause after every cycle.
    pub produce_interval: Duration,

    /// How long the receiver waits for an item per cycle.
    pub receive_timeout: Duration,

    /// How long the supervisor waits for at least one liveness flag.
    pub observe_window: Duration,

    /// Supervisor pause after every cycle.
    pub supervise_interval: Duration,

    /// Maximum time a registered task may go without reporting liveness.
    pub watchdog_timeout: Duration,

    /// Consecutive receive timeouts that raise the escalation warning.
    pub escalate_after: u32,

    /// Consecutive receive timeouts that trigger a channel reset.
    pub recover_after: u32,

    /// Number of item slots available to the pipeline.
    ///
    /// Four slots cover the worst case: one held by the generator, one in the
    /// channel, the receiver's original and its working copy.
    pub pool_capacity: usize,

    /// Capacity of the event bus ring buffer (min 1; clamped by Bus).
    pub bus_capacity: usize,

    /// Maximum wait for tasks to stop on shutdown.
    pub grace: Duration,

    /// Restart policy applied to every pipeline task.
    pub restart: RestartPolicy,

    /// Backoff applied between restarts.
    pub backoff: BackoffPolicy,

    /// Prefix written in front of every log line.
    pub log_prefix: String,
}

impl Config {
    /// Rescales every period to the given time unit, keeping the default ratios.
    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.produce_interval = tick;
        self.receive_timeout = tick;
        self.observe_window = tick * 2;
        self.supervise_interval = tick * 2;
        self.watchdog_timeout = tick * 5;
        self
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the shutdown grace period as an `Option`.
    ///
    /// - `None` → do not wait
    /// - `Some(d)` → wait at most `d`
    #[inline]
    pub fn grace_period(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }

    /// Interval at which the watchdog checks its registered tasks.
    #[inline]
    pub fn watchdog_check_interval(&self) -> Duration {
        (self.watchdog_timeout / 5).max(Duration::from_millis(1))
    }

    /// Checks that the pipeline can be built from this configuration.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        let periods = [
            ("produce_interval", self.produce_interval),
            ("receive_timeout", self.receive_timeout),
            ("observe_window", self.observe_window),
            ("supervise_interval", self.supervise_interval),
            ("watchdog_timeout", self.watchdog_timeout),
        ];
        for (name, d) in periods {
            if d == Duration::ZERO {
                return Err(RuntimeError::resource(
                    "config",
                    format!("{name} must be non-zero"),
                ));
            }
        }
        if self.recover_after == 0 {
            return Err(RuntimeError::resource(
                "config",
                "recover_after must be at least 1",
            ));
        }
        if self.escalate_after == 0 || self.escalate_after > self.recover_after {
            return Err(RuntimeError::resource(
                "config",
                format!(
                    "escalate_after ({}) must be in 1..={}",
                    self.escalate_after, self.recover_after
                ),
            ));
        }
        if self.pool_capacity == 0 {
            return Err(RuntimeError::resource(
                "item pool",
                "capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - one time unit = `1s` (see module docs for the derived periods)
    /// - `escalate_after = 3`, `recover_after = 5`
    /// - `pool_capacity = 4`
    /// - `bus_capacity = 1024`
    /// - `grace = 5s`
    /// - `restart = RestartPolicy::OnFailure`, `backoff = BackoffPolicy::default()`
    fn default() -> Self {
        Self {
            produce_interval: Duration::ZERO,
            receive_timeout: Duration::ZERO,
            observe_window: Duration::ZERO,
            supervise_interval: Duration::ZERO,
            watchdog_timeout: Duration::ZERO,
            escalate_after: 3,
            recover_after: 5,
            pool_capacity: 4,
            bus_capacity: 1024,
            grace: Duration::from_secs(5),
            restart: RestartPolicy::default(),
            backoff: BackoffPolicy::default(),
            log_prefix: String::from("[handoff]"),
        }
        .with_tick(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_one_second_unit() {
        let cfg = Config::default();
        assert_eq!(cfg.produce_interval, Duration::from_secs(1));
        assert_eq!(cfg.receive_timeout, Duration::from_secs(1));
        assert_eq!(cfg.observe_window, Duration::from_secs(2));
        assert_eq!(cfg.supervise_interval, Duration::from_secs(2));
        assert_eq!(cfg.watchdog_timeout, Duration::from_secs(5));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn with_tick_rescales_every_period() {
        let cfg = Config::default().with_tick(Duration::from_millis(10));
        assert_eq!(cfg.observe_window, Duration::from_millis(20));
        assert_eq!(cfg.watchdog_timeout, Duration::from_millis(50));
        assert_eq!(cfg.watchdog_check_interval(), Duration::from_millis(10));
    }

    #[test]
    fn rejects_zero_pool() {
        let cfg = Config {
            pool_capacity: 0,
            ..Config::default()
        };
        match cfg.validate() {
            Err(RuntimeError::ResourceCreation { resource, .. }) => assert_eq!(resource, "item pool"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_escalation_after_recovery() {
        let cfg = Config {
            escalate_after: 6,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_grace_means_no_wait() {
        let cfg = Config {
            grace: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(cfg.grace_period(), None);
    }
}
