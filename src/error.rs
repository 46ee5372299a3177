//! Error types used by the stopgate runtime and tasks.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`] — the outcome of [`Orchestrator::start`](crate::Orchestrator::start).
//! - [`TaskError`] — errors raised by individual task start/stop operations.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;

use thiserror::Error;

use crate::core::Phase;

/// # Errors produced by the stopgate runtime.
///
/// Only the **first** error raised during a run is returned from
/// [`Orchestrator::start`](crate::Orchestrator::start); later ones are logged and dropped.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A critical task failed to start; the whole orchestrator was shut down.
    #[error("critical task {task:?} failed to start: {source}")]
    StartFailed {
        /// Name of the failed task.
        task: String,
        /// Error returned by the task's start operation.
        #[source]
        source: TaskError,
    },

    /// A task's stop operation returned an error (including a missed deadline).
    #[error("task {task:?} failed to stop: {source}")]
    StopFailed {
        /// Name of the failed task.
        task: String,
        /// Error returned by (or on behalf of) the task's stop operation.
        #[source]
        source: TaskError,
    },

    /// A start or stop unit panicked.
    #[error("{phase} unit of task {task:?} panicked")]
    UnitPanicked {
        /// Name of the task whose unit panicked.
        task: String,
        /// Which unit panicked.
        phase: Phase,
    },

    /// Subscribing to OS termination signals failed; no task was started.
    #[error("failed to register shutdown signals: {0}")]
    SignalSetup(#[source] std::io::Error),

    /// `start()` was called on an orchestrator that already ran.
    #[error("orchestrator already started; build a fresh one per run")]
    AlreadyStarted,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use stopgate::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::AlreadyStarted.as_label(), "runtime_already_started");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::StartFailed { .. } => "runtime_start_failed",
            RuntimeError::StopFailed { .. } => "runtime_stop_failed",
            RuntimeError::UnitPanicked { .. } => "runtime_unit_panicked",
            RuntimeError::SignalSetup(_) => "runtime_signal_setup",
            RuntimeError::AlreadyStarted => "runtime_already_started",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::StartFailed { task, source } => {
                format!("start failed: task={task} {}", source.as_message())
            }
            RuntimeError::StopFailed { task, source } => {
                format!("stop failed: task={task} {}", source.as_message())
            }
            RuntimeError::UnitPanicked { task, phase } => {
                format!("panic: task={task} phase={phase}")
            }
            RuntimeError::SignalSetup(e) => format!("signal setup: {e}"),
            RuntimeError::AlreadyStarted => "already started".to_string(),
        }
    }

    /// Name of the task this error is attributed to, if any.
    pub fn task(&self) -> Option<&str> {
        match self {
            RuntimeError::StartFailed { task, .. }
            | RuntimeError::StopFailed { task, .. }
            | RuntimeError::UnitPanicked { task, .. } => Some(task),
            RuntimeError::SignalSetup(_) | RuntimeError::AlreadyStarted => None,
        }
    }

    /// The underlying task error, for start and stop failures.
    pub fn task_error(&self) -> Option<&TaskError> {
        match self {
            RuntimeError::StartFailed { source, .. } | RuntimeError::StopFailed { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

/// # Errors produced by task start/stop operations.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The stop deadline elapsed before teardown completed.
    #[error("deadline exceeded after {timeout:?}")]
    DeadlineExceeded {
        /// The stop budget that was exceeded.
        timeout: Duration,
    },

    /// Non-recoverable fatal error.
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Operation failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Operation returned because its context was cancelled.
    ///
    /// Never surfaced from `start()`: a cancelled start is a normal exit.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Shorthand for [`TaskError::Fatal`].
    pub fn fatal(error: impl Into<String>) -> Self {
        TaskError::Fatal {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use stopgate::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::DeadlineExceeded { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_deadline_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::DeadlineExceeded { .. } => "task_deadline_exceeded",
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::DeadlineExceeded { timeout } => format!("deadline: {timeout:?}"),
            TaskError::Fatal { error } => format!("fatal: {error}"),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }

    /// `true` for [`TaskError::Canceled`], which the runtime filters out.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_error_exposes_task_and_source() {
        let err = RuntimeError::StartFailed {
            task: "db".into(),
            source: TaskError::fail("no route"),
        };
        assert_eq!(err.task(), Some("db"));
        assert_eq!(err.task_error(), Some(&TaskError::fail("no route")));
        assert_eq!(err.as_label(), "runtime_start_failed");
        assert_eq!(
            err.to_string(),
            "critical task \"db\" failed to start: execution failed: no route"
        );
    }

    #[test]
    fn panic_error_has_no_task_error() {
        let err = RuntimeError::UnitPanicked {
            task: "cache".into(),
            phase: Phase::Stop,
        };
        assert_eq!(err.task(), Some("cache"));
        assert!(err.task_error().is_none());
        assert_eq!(err.to_string(), "stop unit of task \"cache\" panicked");
    }

    #[test]
    fn only_canceled_counts_as_cancellation() {
        assert!(TaskError::Canceled.is_cancellation());
        assert!(!TaskError::fatal("x").is_cancellation());
        assert!(
            !TaskError::DeadlineExceeded {
                timeout: Duration::from_secs(1)
            }
            .is_cancellation()
        );
    }
}
