//! # Restart policies for task actors.
//!
//! [`RestartPolicy`] decides whether an actor runs its task again after the
//! task loop returned.
//!
//! ```text
//! Ok(())           Never → exit   OnFailure → exit      Always → restart
//! Err(Fail)        Never → exit   OnFailure → backoff   Always → backoff
//! Err(Fatal)       exit (all policies)
//! Err(Canceled)    exit (all policies)
//! ```

/// Policy controlling whether a task is restarted after its loop returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Never restart: the loop runs once.
    Never,
    /// Restart only after a retryable failure (default).
    #[default]
    OnFailure,
    /// Restart after every return, including a clean one.
    Always,
}

impl RestartPolicy {
    /// True if a clean return should start the loop again.
    pub fn restarts_on_success(self) -> bool {
        matches!(self, RestartPolicy::Always)
    }

    /// True if a retryable failure should start the loop again.
    pub fn restarts_on_failure(self) -> bool {
        matches!(self, RestartPolicy::OnFailure | RestartPolicy::Always)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_on_failure() {
        assert_eq!(RestartPolicy::default(), RestartPolicy::OnFailure);
    }

    #[test]
    fn decisions() {
        assert!(!RestartPolicy::Never.restarts_on_failure());
        assert!(!RestartPolicy::OnFailure.restarts_on_success());
        assert!(RestartPolicy::OnFailure.restarts_on_failure());
        assert!(RestartPolicy::Always.restarts_on_success());
    }
}
