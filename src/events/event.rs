//! # Lifecycle events emitted by the orchestrator.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Run events**: shutdown requested, all units stopped
//! - **Task events**: per-task start/stop progress and failures
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name,
//! run id, reasons, and stop budgets.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use stopgate::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskStartFailed)
//!     .with_task("demo-task")
//!     .with_reason("boom")
//!     .with_critical(false);
//!
//! assert_eq!(ev.kind, EventKind::TaskStartFailed);
//! assert_eq!(ev.task.as_deref(), Some("demo-task"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use uuid::Uuid;

use crate::core::ShutdownCause;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Run events ===
    /// Shutdown began. Emitted once per run.
    ///
    /// Sets:
    /// - `cause`: what triggered it
    ShutdownRequested,

    /// Every unit returned; `start()` is about to return.
    ///
    /// Sets:
    /// - `run_id`
    /// - `reason`: the returned error, if any
    AllStopped,

    // === Task events ===
    /// Task's start operation is being invoked.
    ///
    /// Sets:
    /// - `task`, `run_id`, `critical`
    TaskStarting,

    /// Task's start operation failed (or panicked).
    ///
    /// Sets:
    /// - `task`, `run_id`
    /// - `critical`: `true` if this failure shuts the orchestrator down
    /// - `reason`: failure message
    TaskStartFailed,

    /// Task's stop unit observed shutdown and is invoking the stop operation.
    ///
    /// Sets:
    /// - `task`, `run_id`
    /// - `timeout_ms`: stop budget
    TaskStopping,

    /// Task's stop operation returned successfully.
    ///
    /// Sets:
    /// - `task`, `run_id`
    TaskStopped,

    /// Task's stop operation returned an error (or panicked).
    ///
    /// Sets:
    /// - `task`, `run_id`
    /// - `reason`: failure message
    TaskStopFailed,

    /// Task's stop operation was still running at its deadline and was abandoned.
    ///
    /// Sets:
    /// - `task`, `run_id`
    /// - `timeout_ms`: stop budget
    StopDeadlineExceeded,
}

impl EventKind {
    /// Returns a short stable label (kebab-case) for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::ShutdownRequested => "shutdown-requested",
            EventKind::AllStopped => "all-stopped",
            EventKind::TaskStarting => "starting",
            EventKind::TaskStartFailed => "start-failed",
            EventKind::TaskStopping => "stopping",
            EventKind::TaskStopped => "stopped",
            EventKind::TaskStopFailed => "stop-failed",
            EventKind::StopDeadlineExceeded => "stop-deadline-exceeded",
        }
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Run the event belongs to.
    pub run_id: Option<Uuid>,
    /// Human-readable reason (errors, etc.).
    pub reason: Option<Arc<str>>,
    /// Whether the task is critical.
    pub critical: Option<bool>,
    /// Why shutdown began.
    pub cause: Option<ShutdownCause>,
    /// Stop budget in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            run_id: None,
            reason: None,
            critical: None,
            cause: None,
            timeout_ms: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a run id.
    #[inline]
    pub fn with_run(mut self, run_id: Uuid) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the task's criticality.
    #[inline]
    pub fn with_critical(mut self, critical: bool) -> Self {
        self.critical = Some(critical);
        self
    }

    /// Attaches a shutdown cause.
    #[inline]
    pub fn with_cause(mut self, cause: ShutdownCause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Attaches a stop budget (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Stop budget as a [`Duration`], if set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(|ms| Duration::from_millis(u64::from(ms)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::TaskStarting);
        let b = Event::new(EventKind::TaskStopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn timeout_is_clamped_to_u32_millis() {
        let ev = Event::new(EventKind::TaskStopping).with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(ev.timeout_ms, Some(u32::MAX));

        let ev = Event::new(EventKind::TaskStopping).with_timeout(Duration::from_millis(1500));
        assert_eq!(ev.timeout(), Some(Duration::from_millis(1500)));
    }
}
