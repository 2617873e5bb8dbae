//! # Task specification for supervised execution.
//!
//! [`TaskSpec`] bundles a task with the policies its actor applies when the
//! loop returns. The device builds one spec per pipeline task from [`Config`].

use crate::policies::{BackoffPolicy, RestartPolicy};
use crate::runtime::Config;
use crate::tasks::task::TaskRef;

/// Specification for running a task under an actor.
#[derive(Clone)]
pub struct TaskSpec {
    task: TaskRef,
    restart: RestartPolicy,
    backoff: BackoffPolicy,
}

impl TaskSpec {
    /// Creates a new task specification with explicit policies.
    pub fn new(task: TaskRef, restart: RestartPolicy, backoff: BackoffPolicy) -> Self {
        Self {
            task,
            restart,
            backoff,
        }
    }

    /// Creates a task specification inheriting policies from the config.
    pub fn with_defaults(task: TaskRef, cfg: &Config) -> Self {
        Self::new(task, cfg.restart, cfg.backoff)
    }

    /// Returns reference to the task.
    pub fn task(&self) -> &TaskRef {
        &self.task
    }

    /// Convenience: returns the task name.
    pub fn name(&self) -> &str {
        self.task.name()
    }

    /// Returns the restart policy.
    pub fn restart(&self) -> RestartPolicy {
        self.restart
    }

    /// Returns the backoff policy.
    pub fn backoff(&self) -> BackoffPolicy {
        self.backoff
    }
}
