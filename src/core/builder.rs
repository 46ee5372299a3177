use std::sync::Arc;
use std::time::Duration;

use crate::core::config::Config;
use crate::core::orchestrator::Orchestrator;
use crate::core::shutdown::{OsSignals, ShutdownSource, Signal};
use crate::subscribers::Subscribe;
use crate::tasks::TaskRef;

/// Builder for constructing an [`Orchestrator`].
pub struct OrchestratorBuilder {
    cfg: Config,
    tasks: Vec<TaskRef>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    source: Option<Arc<dyn ShutdownSource>>,
}

impl OrchestratorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            tasks: Vec::new(),
            subscribers: Vec::new(),
            source: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Overrides the per-task stop budget (default 60s).
    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.stop_timeout = timeout;
        self
    }

    /// Overrides the set of signals that trigger shutdown.
    pub fn with_signals(mut self, signals: impl IntoIterator<Item = Signal>) -> Self {
        self.cfg.signals = signals.into_iter().collect();
        self
    }

    /// Appends one task to the managed set.
    pub fn add_task(mut self, task: TaskRef) -> Self {
        self.tasks.push(task);
        self
    }

    /// Appends tasks to the managed set, keeping their order.
    pub fn add_tasks(mut self, tasks: impl IntoIterator<Item = TaskRef>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events (task start failures, stop progress, shutdown cause)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Replaces the OS signal source (default: [`OsSignals`]).
    pub fn with_shutdown_source(mut self, source: impl ShutdownSource) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Builds the orchestrator. Does not need a running tokio runtime.
    pub fn build(self) -> Orchestrator {
        let source = self.source.unwrap_or_else(|| Arc::new(OsSignals));
        Orchestrator::from_parts(self.cfg, self.tasks, self.subscribers, source)
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::core::state::State;
    use crate::error::TaskError;
    use crate::tasks::TaskFn;

    fn idle(name: &'static str) -> TaskRef {
        TaskFn::new(name, |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Ok::<_, TaskError>(())
        })
        .into_ref()
    }

    #[test]
    fn options_override_defaults() {
        let orch = OrchestratorBuilder::default()
            .with_stop_timeout(Duration::from_millis(250))
            .with_signals([Signal::Terminate])
            .build();

        assert_eq!(orch.config().stop_timeout, Duration::from_millis(250));
        assert_eq!(orch.config().signals, vec![Signal::Terminate]);
        assert_eq!(orch.state(), State::Idle);
        assert!(orch.tasks().is_empty());
    }

    #[test]
    fn add_tasks_keeps_every_task_once() {
        let t1 = idle("t1");
        let t2 = idle("t2");
        let orch = Orchestrator::builder()
            .add_tasks([Arc::clone(&t1), Arc::clone(&t2)])
            .build();

        assert_eq!(orch.tasks().len(), 2);
        assert!(Arc::ptr_eq(&orch.tasks()[0], &t1));
        assert!(Arc::ptr_eq(&orch.tasks()[1], &t2));
        assert_eq!(orch.task_names(), vec!["t1", "t2"]);
    }

    #[test]
    fn add_task_appends_after_add_tasks() {
        let orch = Orchestrator::builder()
            .add_tasks([idle("a")])
            .add_task(idle("b"))
            .add_tasks([idle("c")])
            .build();
        assert_eq!(orch.task_names(), vec!["a", "b", "c"]);
    }
}
