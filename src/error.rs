//! Error types used by the handoff runtime, its tasks and its primitives.
//!
//! Three layers, none of which crosses a task boundary:
//!
//! - primitive errors: [`TrySendError`], [`RecvTimeout`], [`AllocError`], [`ItemError`];
//! - [`TaskError`] raised by a task loop and consumed by its actor;
//! - [`RuntimeError`] raised by the device itself (startup and watchdog).
//!
//! The task and runtime errors provide `as_label` for logs/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the device runtime.
///
/// Every variant ends the current device run; the binary maps them to a
/// non-zero exit status so the host supervisor restarts the process.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A shared primitive (or its configuration) could not be created at startup.
    #[error("failed to create {resource}: {reason}")]
    ResourceCreation {
        /// Name of the resource that failed ("channel", "item pool", ...).
        resource: &'static str,
        /// Why creation failed.
        reason: String,
    },

    /// A registered task did not report liveness within the watchdog timeout.
    #[error("watchdog expired for task {task:?} after {timeout:?}")]
    WatchdogExpired {
        /// Name of the first overdue task.
        task: String,
        /// The configured watchdog timeout.
        timeout: Duration,
    },

    /// Shutdown grace period was exceeded; some tasks remained stuck.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Task names that did not stop in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use handoff::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::WatchdogExpired { task: "receiver".into(), timeout: Duration::from_secs(5) };
    /// assert_eq!(err.as_label(), "runtime_watchdog_expired");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::ResourceCreation { .. } => "runtime_resource_creation",
            RuntimeError::WatchdogExpired { .. } => "runtime_watchdog_expired",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with the error details.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::ResourceCreation { resource, reason } => {
                format!("cannot create {resource}: {reason}")
            }
            RuntimeError::WatchdogExpired { task, timeout } => {
                format!("task {task} silent for more than {timeout:?}")
            }
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck tasks={stuck:?}")
            }
        }
    }

    pub(crate) fn resource(resource: &'static str, reason: impl Into<String>) -> Self {
        RuntimeError::ResourceCreation {
            resource,
            reason: reason.into(),
        }
    }
}

/// # Errors produced by a task loop.
///
/// Consumed by the task's actor: `Fail` is retried per restart policy,
/// `Fatal` stops the actor, `Canceled` is a graceful exit.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Non-recoverable fatal error (should not be retried).
    #[error("fatal error (no retry): {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Task loop failed but may succeed if restarted.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task was cancelled because the device is shutting down.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use handoff::TaskError;
    ///
    /// let err = TaskError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with the error details.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fatal { error } => format!("fatal: {error}"),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }

    /// Indicates whether the actor may restart the task after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TaskError::Fail { .. })
    }
}

/// Rejected non-blocking send: the slot was occupied.
///
/// Ownership of the value stays with the caller and is handed back here.
#[derive(Error, PartialEq, Eq)]
pub enum TrySendError<T> {
    #[error("channel full")]
    Full(T),
}

impl<T> TrySendError<T> {
    /// Takes the rejected value back.
    pub fn into_inner(self) -> T {
        match self {
            TrySendError::Full(v) => v,
        }
    }
}

impl<T> std::fmt::Debug for TrySendError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Full(..)")
    }
}

/// Nothing arrived before the receive window closed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no item received within {timeout:?}")]
pub struct RecvTimeout {
    pub timeout: Duration,
}

/// Every slot of the item pool is in use.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("item pool exhausted ({capacity} slots in use)")]
pub struct AllocError {
    pub capacity: usize,
}

/// Reasons a received item fails validation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemError {
    #[error("value {value} does not match id {id}")]
    ValueMismatch { id: u64, value: u64 },

    #[error("id must start at 1")]
    NonPositiveId,

    #[error("id {id} is not after last accepted id {last}")]
    OutOfOrder { id: u64, last: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_hands_value_back() {
        let err = TrySendError::Full(7u64);
        assert_eq!(err.to_string(), "channel full");
        assert_eq!(err.into_inner(), 7);
    }

    #[test]
    fn messages() {
        assert_eq!(TaskError::Fail { error: "x".into() }.as_message(), "error: x");
        let err = RuntimeError::WatchdogExpired {
            task: "receiver".into(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(err.as_message(), "task receiver silent for more than 5s");
    }

    #[test]
    fn only_fail_is_retryable() {
        assert!(TaskError::Fail { error: "x".into() }.is_retryable());
        assert!(!TaskError::Fatal { error: "x".into() }.is_retryable());
        assert!(!TaskError::Canceled.is_retryable());
    }

    #[test]
    fn resource_error_message() {
        let err = RuntimeError::resource("item pool", "capacity must be at least 1");
        assert_eq!(err.as_label(), "runtime_resource_creation");
        assert_eq!(
            err.to_string(),
            "failed to create item pool: capacity must be at least 1"
        );
    }
}
