//! # Orchestrator: public lifecycle API.
//!
//! The [`Orchestrator`] owns the managed tasks, the [`Config`], the shutdown source and the
//! cancellation root. [`start`](Orchestrator::start) runs one full lifecycle; [`stop`](Orchestrator::stop)
//! (or an [`OrchestratorHandle`]) requests shutdown.
//!
//! ## Lifecycle
//! ```text
//! build() ──► Idle
//!               │ start()
//!               ▼
//!   listen(signals)           (fails fast: RuntimeError::SignalSetup)
//!   spawn 2N units + coordination unit
//!               │
//!            Running ── stop() / signal / critical failure ──► root.cancel()
//!               │                                                  │
//!               ▼                                                  ▼
//!            Stopping  ◄──────────── every stop unit runs on_stop under its deadline
//!               │ all units returned
//!               ▼
//!           Terminated ──► start() returns first error (or Ok)
//! ```
//!
//! ## Rules
//! - One run per orchestrator: a second `start()` returns [`RuntimeError::AlreadyStarted`].
//! - `stop()` never waits and never fails; calling it before `start()` makes the run shut down
//!   immediately, calling it after the run is a no-op.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use stopgate::{ManualShutdown, Orchestrator, TaskError, TaskFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let worker = TaskFn::new("worker", |ctx: CancellationToken| async move {
//!         ctx.cancelled().await;
//!         Ok::<_, TaskError>(())
//!     })
//!     .into_ref();
//!
//!     let orchestrator = Orchestrator::builder()
//!         .with_stop_timeout(Duration::from_secs(5))
//!         .add_tasks([worker])
//!         .with_shutdown_source(ManualShutdown::new())
//!         .build();
//!
//!     let handle = orchestrator.handle();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(10)).await;
//!         handle.stop();
//!     });
//!
//!     orchestrator.start().await?;
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::core::builder::OrchestratorBuilder;
use crate::core::config::Config;
use crate::core::group::UnitGroup;
use crate::core::shutdown::{self, ShutdownCause, ShutdownSource, ShutdownTrigger};
use crate::core::state::{State, StateCell};
use crate::core::supervisor::Supervisor;
use crate::error::RuntimeError;
use crate::events::{Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::TaskRef;

/// Starts a set of tasks concurrently and drives their coordinated shutdown.
pub struct Orchestrator {
    cfg: Config,
    tasks: Vec<TaskRef>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    source: Arc<dyn ShutdownSource>,
    trigger: Arc<ShutdownTrigger>,
    state: Arc<StateCell>,
}

impl Orchestrator {
    /// Returns a builder with the default [`Config`].
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new(Config::default())
    }

    /// Shorthand for a builder with `cfg` and `tasks`, OS signals and no subscribers.
    pub fn new(cfg: Config, tasks: impl IntoIterator<Item = TaskRef>) -> Self {
        OrchestratorBuilder::new(cfg).add_tasks(tasks).build()
    }

    pub(crate) fn from_parts(
        cfg: Config,
        tasks: Vec<TaskRef>,
        subscribers: Vec<Arc<dyn Subscribe>>,
        source: Arc<dyn ShutdownSource>,
    ) -> Self {
        Self {
            cfg,
            tasks,
            subscribers,
            source,
            trigger: Arc::new(ShutdownTrigger::new()),
            state: Arc::new(StateCell::new()),
        }
    }

    /// Runs every task until shutdown, then waits for every stop phase.
    ///
    /// Returns `Ok(())` after a clean shutdown (explicit stop or signal), otherwise the first
    /// error raised by a critical start or any stop phase.
    pub async fn start(&self) -> Result<(), RuntimeError> {
        if !self.state.advance(State::Idle, State::Running) {
            return Err(RuntimeError::AlreadyStarted);
        }

        let listener = match self.source.listen(&self.cfg.signal_set()) {
            Ok(listener) => listener,
            Err(e) => {
                self.state.set(State::Terminated);
                error!(error = %e, "failed to register shutdown signals");
                return Err(RuntimeError::SignalSetup(e));
            }
        };

        let run_id = Uuid::new_v4();
        let subs = Arc::new(if self.subscribers.is_empty() {
            SubscriberSet::empty()
        } else {
            SubscriberSet::new(self.subscribers.clone())
        });
        info!(
            %run_id,
            tasks = self.tasks.len(),
            subscribers = subs.len(),
            stop_timeout = ?self.cfg.stop_timeout,
            "starting orchestrator"
        );

        let mut group = UnitGroup::new(self.trigger.root().clone());
        Supervisor::new(
            run_id,
            self.cfg.stop_timeout,
            Arc::clone(&self.trigger),
            Arc::clone(&subs),
        )
        .spawn_units(&mut group, &self.tasks);

        let coordinator = shutdown::coordinate(
            listener,
            Arc::clone(&self.trigger),
            Arc::clone(&self.state),
            Arc::clone(&subs),
        );
        group.spawn(async move {
            coordinator.await;
            Ok(())
        });
        debug!(units = group.len(), "units spawned");

        let res = group.wait().await;
        self.state.set(State::Terminated);

        let mut done = Event::new(EventKind::AllStopped).with_run(run_id);
        if let Err(e) = &res {
            done = done.with_reason(e.to_string());
        }
        subs.emit(&done);
        match Arc::try_unwrap(subs) {
            Ok(set) => set.shutdown().await,
            Err(_) => debug!("subscriber set still shared; skipping drain"),
        }

        match &res {
            Ok(()) => info!(%run_id, "all tasks stopped"),
            Err(e) => error!(%run_id, error = %e, label = e.as_label(), "run finished with error"),
        }
        res
    }

    /// Requests shutdown. Idempotent, never blocks, safe from any thread.
    pub fn stop(&self) {
        self.trigger.request(ShutdownCause::Explicit);
    }

    /// Returns a cloneable handle that can stop this orchestrator from elsewhere.
    pub fn handle(&self) -> OrchestratorHandle {
        OrchestratorHandle {
            trigger: Arc::clone(&self.trigger),
            state: Arc::clone(&self.state),
        }
    }

    /// Managed tasks, in insertion order.
    pub fn tasks(&self) -> &[TaskRef] {
        &self.tasks
    }

    /// Names of the managed tasks, in insertion order.
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state.get()
    }

    /// The configuration this orchestrator was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("cfg", &self.cfg)
            .field("tasks", &self.task_names())
            .field("subscribers", &self.subscribers.len())
            .field("state", &self.state.get())
            .finish()
    }
}

/// Cloneable remote control for an [`Orchestrator`].
#[derive(Clone, Debug)]
pub struct OrchestratorHandle {
    trigger: Arc<ShutdownTrigger>,
    state: Arc<StateCell>,
}

impl OrchestratorHandle {
    /// Same as [`Orchestrator::stop`].
    pub fn stop(&self) {
        self.trigger.request(ShutdownCause::Explicit);
    }

    /// `true` once shutdown has been requested by any cause.
    pub fn is_stopping(&self) -> bool {
        self.trigger.is_requested()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state.get()
    }
}
