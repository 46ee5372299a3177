//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(CancellationToken) -> Fut` for the start phase and,
//! optionally, a closure `Fn(StopContext) -> Fut` for the stop phase. Each call creates a
//! **new** future; if the two phases need shared state, capture an `Arc<...>` in both closures.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use stopgate::{StopContext, TaskError, TaskFn, TaskRef};
//!
//! let t: TaskRef = TaskFn::new("worker", |ctx: CancellationToken| async move {
//!     ctx.cancelled().await;
//!     Ok::<_, TaskError>(())
//! })
//! .with_stop(|_ctx: StopContext| async { Ok(()) })
//! .critical(true)
//! .into_ref();
//!
//! assert_eq!(t.name(), "worker");
//! assert!(t.is_critical());
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::core::StopContext;
use crate::error::TaskError;
use crate::tasks::task::{Task, TaskRef};

type StopFn = Box<dyn Fn(StopContext) -> BoxFuture<'static, Result<(), TaskError>> + Send + Sync>;

/// Function-backed task implementation.
///
/// Without [`with_stop`](TaskFn::with_stop) the stop phase is a no-op returning `Ok(())`.
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    critical: bool,
    start: F,
    stop: Option<StopFn>,
}

impl<F> TaskFn<F> {
    /// Creates a new non-critical function-backed task.
    pub fn new(name: impl Into<Cow<'static, str>>, start: F) -> Self {
        Self {
            name: name.into(),
            critical: false,
            start,
            stop: None,
        }
    }

    /// Creates the task and returns it as a shared handle.
    ///
    /// ## Example
    /// ```rust
    /// use tokio_util::sync::CancellationToken;
    /// use stopgate::{Task, TaskFn, TaskError};
    ///
    /// let t = TaskFn::arc("hello", |_ctx: CancellationToken| async {
    ///     Ok::<_, TaskError>(())
    /// });
    /// assert_eq!(t.name(), "hello");
    /// ```
    pub fn arc(name: impl Into<Cow<'static, str>>, start: F) -> Arc<Self> {
        Arc::new(Self::new(name, start))
    }

    /// Marks the task as critical (or not).
    pub fn critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    /// Sets the stop-phase closure.
    pub fn with_stop<S, Fut>(mut self, stop: S) -> Self
    where
        S: Fn(StopContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.stop = Some(Box::new(move |ctx| Box::pin(stop(ctx))));
        self
    }
}

impl<F, Fut> TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    /// Finishes the task into a [`TaskRef`].
    pub fn into_ref(self) -> TaskRef {
        Arc::new(self)
    }
}

impl<F> fmt::Debug for TaskFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFn")
            .field("name", &self.name)
            .field("critical", &self.critical)
            .field("has_stop", &self.stop.is_some())
            .finish()
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn is_critical(&self) -> bool {
        self.critical
    }

    async fn on_start(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        (self.start)(ctx).await
    }

    async fn on_stop(&self, ctx: StopContext) -> Result<(), TaskError> {
        match &self.stop {
            Some(stop) => stop(ctx).await,
            None => Ok(()),
        }
    }
}
