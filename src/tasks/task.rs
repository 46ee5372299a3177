//! # Task contract.
//!
//! This module defines the [`Task`] trait: the capability set every background task
//! managed by an [`Orchestrator`](crate::Orchestrator) must provide.
//! The common handle type is [`TaskRef`], an `Arc<dyn Task>` suitable for sharing across the runtime.
//!
//! A task has two phases:
//! - **start**: receives a [`CancellationToken`] and runs the main work until it is cancelled;
//! - **stop**: receives a [`StopContext`] and tears down before its deadline.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::StopContext;
use crate::error::TaskError;

/// Shared handle to a task object.
pub type TaskRef = Arc<dyn Task>;

/// # Background task with start and stop phases.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use stopgate::{StopContext, Task, TaskError};
/// use tokio_util::sync::CancellationToken;
///
/// struct Listener;
///
/// #[async_trait]
/// impl Task for Listener {
///     fn name(&self) -> &str { "listener" }
///
///     fn is_critical(&self) -> bool { true }
///
///     async fn on_start(&self, ctx: CancellationToken) -> Result<(), TaskError> {
///         ctx.cancelled().await;
///         Ok(())
///     }
///
///     async fn on_stop(&self, ctx: StopContext) -> Result<(), TaskError> {
///         // flush buffers, close sockets...
///         match ctx.err() {
///             Some(e) => Err(e),
///             None => Ok(()),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Whether a start failure of this task must shut the whole orchestrator down.
    ///
    /// Non-critical start failures are reported to subscribers only.
    fn is_critical(&self) -> bool {
        false
    }

    /// Performs the task's main work.
    ///
    /// Must return once `ctx` is cancelled. Returning [`TaskError::Canceled`]
    /// is treated as a normal exit.
    async fn on_start(&self, ctx: CancellationToken) -> Result<(), TaskError>;

    /// Performs graceful teardown.
    ///
    /// Called exactly once per run after shutdown begins. Should return promptly once
    /// `ctx` expires; past the deadline the runtime drops this future.
    async fn on_stop(&self, ctx: StopContext) -> Result<(), TaskError>;
}
