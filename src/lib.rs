//! # stopgate
//!
//! **Stopgate** starts a set of background tasks concurrently, watches for termination
//! signals or critical task failures, and drives a coordinated, timeout-bounded shutdown
//! of every task.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │     Task     │   │     Task     │   │     Task     │
//!     │ (critical)   │   │              │   │              │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Orchestrator                                                     │
//! │  - root CancellationToken (the only shutdown trigger)             │
//! │  - Supervisor (one start unit + one stop unit per task)           │
//! │  - UnitGroup (JoinSet + first-error slot)                         │
//! │  - coordination unit (ShutdownSource ──► root)                    │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               ▼
//!   start unit         stop unit          start unit      coordination
//!   on_start(token)    wait(root)         ...             select!(root, signal)
//!                      on_stop(StopContext)
//! ```
//!
//! ### Shutdown
//! ```text
//! stop() ─────────────────┐
//! OS signal ──────────────┼──► root.cancel() ──► every stop unit wakes
//! critical start failure ─┘                          │
//!                                                    ▼
//!                          on_stop(ctx) with deadline = now + stop_timeout (concurrently)
//!                                                    │
//!                                                    ▼
//!                          start() returns the first error, or Ok(())
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Lifecycle**     | One start/stop cycle over a set of tasks.                    | [`Orchestrator`], [`OrchestratorHandle`]    |
//! | **Tasks**         | Task contract and closure-backed tasks.                      | [`Task`], [`TaskFn`], [`TaskRef`]           |
//! | **Stop budget**   | Per-task deadline-bounded teardown.                          | [`StopContext`], [`Config`]                 |
//! | **Signals**       | Pluggable shutdown sources (OS or in-process).               | [`ShutdownSource`], [`OsSignals`], [`ManualShutdown`] |
//! | **Errors**        | Typed errors for orchestration and task execution.           | [`RuntimeError`], [`TaskError`]             |
//! | **Subscriber API**| Observe lifecycle events, including swallowed failures.      | [`Subscribe`], [`Event`]                    |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] that forwards events to `tracing`.
//!
//! ## Example
//! ```rust,no_run
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use stopgate::{Orchestrator, StopContext, TaskError, TaskFn};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = TaskFn::new("server", |ctx: CancellationToken| async move {
//!         // accept connections until shutdown...
//!         ctx.cancelled().await;
//!         Ok::<_, TaskError>(())
//!     })
//!     .with_stop(|ctx: StopContext| async move {
//!         // drain in-flight requests, but never past the deadline
//!         tokio::select! {
//!             _ = tokio::time::sleep(Duration::from_millis(100)) => Ok(()),
//!             _ = ctx.expired() => Err(TaskError::DeadlineExceeded { timeout: ctx.timeout() }),
//!         }
//!     })
//!     .critical(true)
//!     .into_ref();
//!
//!     let orchestrator = Orchestrator::builder()
//!         .with_stop_timeout(Duration::from_secs(10))
//!         .add_tasks([server])
//!         .build();
//!
//!     // Runs until SIGINT/SIGTERM/SIGQUIT or a critical failure.
//!     orchestrator.start().await?;
//!     Ok(())
//! }
//! ```
//!
//! One [`Orchestrator`] drives exactly one lifecycle; build a fresh one for each run.

mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{
    Config, DEFAULT_STOP_TIMEOUT, ManualShutdown, Orchestrator, OrchestratorBuilder,
    OrchestratorHandle, OsSignals, Phase, ShutdownCause, ShutdownListener, ShutdownSource,
    Signal, State, StopContext,
};
pub use error::{RuntimeError, TaskError};
pub use events::{Event, EventKind};
pub use subscribers::Subscribe;
pub use tasks::{Task, TaskFn, TaskRef};

// Optional: expose a built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
