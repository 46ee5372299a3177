//! Runtime core: orchestration and lifecycle.
//!
//! The public API from this module is [`Orchestrator`] (with its builder and handle),
//! [`Config`], [`StopContext`], and the shutdown-source types.
//!
//! Internal modules:
//! - [`orchestrator`]: public `start`/`stop` API and the run state machine;
//! - [`supervisor`]: spawns each task's start and stop units;
//! - [`group`]: fan-in of units with one shared cancel and a first-error slot;
//! - [`shutdown`]: shutdown causes, signal sources, and the coordination unit;
//! - [`stop_ctx`]: deadline-bounded context handed to stop phases;
//! - [`state`]: lifecycle states.

mod builder;
mod config;
mod group;
mod orchestrator;
mod shutdown;
mod state;
mod stop_ctx;
mod supervisor;

pub use builder::OrchestratorBuilder;
pub use config::{Config, DEFAULT_STOP_TIMEOUT};
pub use orchestrator::{Orchestrator, OrchestratorHandle};
pub use shutdown::{
    ManualShutdown, OsSignals, ShutdownCause, ShutdownListener, ShutdownSource, Signal,
};
pub use state::{Phase, State};
pub use stop_ctx::StopContext;

pub(crate) use group::panic_message;
