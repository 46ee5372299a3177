//! # Deadline-bounded context handed to a task's stop phase.
//!
//! Each stop unit builds its own [`StopContext`] when it observes shutdown:
//!
//! ```text
//! root cancelled ──► StopContext { task, run_id, deadline = now + stop_timeout }
//!                        │
//!                        ├─► task.on_stop(ctx)           (raced against the deadline)
//!                        └─► token cancelled at deadline or when the unit exits
//! ```
//!
//! Tasks can poll [`StopContext::is_expired`], await [`StopContext::expired`], or hand
//! [`StopContext::token`] to their own sub-tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::TaskError;

/// Upper bound for a stop deadline (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Per-task, per-run stop scope.
///
/// Cheap to clone; clones share the same deadline and token.
#[derive(Clone, Debug)]
pub struct StopContext {
    task: Arc<str>,
    run_id: Uuid,
    timeout: Duration,
    deadline: Instant,
    token: CancellationToken,
}

impl StopContext {
    /// Creates a context whose deadline is `now + timeout`.
    ///
    /// Budgets too large to represent as an instant are capped at roughly 30 years from now.
    pub fn new(task: impl Into<Arc<str>>, run_id: Uuid, timeout: Duration) -> Self {
        let now = Instant::now();
        let deadline = now
            .checked_add(timeout)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        Self {
            task: task.into(),
            run_id,
            timeout,
            deadline,
            token: CancellationToken::new(),
        }
    }

    /// Name of the task being stopped.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Identifier shared by every stop context of one `start()` run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The stop budget this context was created with.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Instant at which the context expires.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left until the deadline (zero once expired).
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// `true` once the deadline passed or the stop unit released the context.
    pub fn is_expired(&self) -> bool {
        self.token.is_cancelled() || Instant::now() >= self.deadline
    }

    /// Completes when the context expires.
    pub async fn expired(&self) {
        tokio::select! {
            _ = self.token.cancelled() => {}
            _ = time::sleep_until(self.deadline) => {}
        }
    }

    /// `Some(DeadlineExceeded)` once expired, `None` before.
    pub fn err(&self) -> Option<TaskError> {
        self.is_expired().then_some(TaskError::DeadlineExceeded {
            timeout: self.timeout,
        })
    }

    /// Token cancelled when the context expires.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Marks the context as expired.
    pub(crate) fn expire(&self) {
        self.token.cancel();
    }
}
