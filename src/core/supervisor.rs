//! # Supervisor: per-task start and stop units.
//!
//! For every task the supervisor spawns **two** units into the run's [`UnitGroup`]:
//!
//! ```text
//! Task[i] ──► start unit: on_start(root.child_token())
//!         │        ├─ Ok / Canceled          → Ok
//!         │        ├─ Err, non-critical      → TaskStartFailed event, swallowed
//!         │        └─ Err/panic, critical    → TaskStartFailed event,
//!         │                                    note(CriticalFailure), Err(StartFailed)
//!         │
//!         └─► stop unit: root.cancelled().await
//!                  └─ StopContext { deadline = now + stop_timeout }
//!                       select! (biased)
//!                         ├─ on_stop returned Ok     → TaskStopped
//!                         ├─ on_stop returned Err    → TaskStopFailed, Err(StopFailed)
//!                         └─ deadline reached first  → StopDeadlineExceeded,
//!                                                      Err(StopFailed(DeadlineExceeded))
//! ```
//!
//! ## Rules
//! - Each task's `on_stop` runs **exactly once** per run, whatever triggered shutdown.
//! - All stop units wake on the same broadcast, so stop phases run concurrently.
//! - The stop deadline is taken when the unit observes cancellation.
//! - Panics in either phase are caught and reported like errors of that phase; a panic
//!   outside the task call is attributed to the unit by the group.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time;
use tracing::{Instrument, debug, error, info_span, warn};
use uuid::Uuid;

use crate::core::group::{UnitGroup, panic_message};
use crate::core::shutdown::{ShutdownCause, ShutdownTrigger};
use crate::core::state::Phase;
use crate::core::stop_ctx::StopContext;
use crate::error::{RuntimeError, TaskError};
use crate::events::{Event, EventKind};
use crate::subscribers::SubscriberSet;
use crate::tasks::TaskRef;

/// Spawns and drives the units of one run.
pub(crate) struct Supervisor {
    run_id: Uuid,
    stop_timeout: Duration,
    trigger: Arc<ShutdownTrigger>,
    subs: Arc<SubscriberSet>,
}

impl Supervisor {
    pub(crate) fn new(
        run_id: Uuid,
        stop_timeout: Duration,
        trigger: Arc<ShutdownTrigger>,
        subs: Arc<SubscriberSet>,
    ) -> Self {
        Self {
            run_id,
            stop_timeout,
            trigger,
            subs,
        }
    }

    /// Spawns a stop unit and a start unit for each task.
    pub(crate) fn spawn_units(&self, group: &mut UnitGroup, tasks: &[TaskRef]) {
        for task in tasks {
            let name: Arc<str> = Arc::from(task.name());
            self.spawn_stop_unit(group, Arc::clone(task), Arc::clone(&name));
            self.spawn_start_unit(group, Arc::clone(task), name);
        }
    }

    fn spawn_start_unit(&self, group: &mut UnitGroup, task: TaskRef, name: Arc<str>) {
        let ctx = self.trigger.root().child_token();
        let trigger = Arc::clone(&self.trigger);
        let subs = Arc::clone(&self.subs);
        let run_id = self.run_id;
        let span = info_span!("start_unit", task = %name, %run_id);

        group.spawn_for(
            Arc::clone(&name),
            Phase::Start,
            async move {
                let critical = task.is_critical();
                subs.emit(
                    &Event::new(EventKind::TaskStarting)
                        .with_task(Arc::clone(&name))
                        .with_run(run_id)
                        .with_critical(critical),
                );
                debug!(critical, "starting task");

                let started = AssertUnwindSafe(task.on_start(ctx)).catch_unwind().await;
                let (err, reason) = match started {
                    Ok(Ok(())) => return Ok(()),
                    Ok(Err(e)) if e.is_cancellation() => return Ok(()),
                    Ok(Err(e)) => {
                        let reason = e.to_string();
                        let err = RuntimeError::StartFailed {
                            task: name.to_string(),
                            source: e,
                        };
                        (err, reason)
                    }
                    Err(panic) => {
                        let reason = format!("panicked: {}", panic_message(panic.as_ref()));
                        let err = RuntimeError::UnitPanicked {
                            task: name.to_string(),
                            phase: Phase::Start,
                        };
                        (err, reason)
                    }
                };

                subs.emit(
                    &Event::new(EventKind::TaskStartFailed)
                        .with_task(Arc::clone(&name))
                        .with_run(run_id)
                        .with_critical(critical)
                        .with_reason(reason.as_str()),
                );

                if !critical {
                    warn!(error = %reason, "non-critical task failed to start; continuing");
                    return Ok(());
                }
                error!(error = %reason, "critical task failed to start");
                // The group stores `err` before it cancels the root.
                trigger.note(ShutdownCause::CriticalFailure { task: name });
                Err(err)
            }
            .instrument(span),
        );
    }

    fn spawn_stop_unit(&self, group: &mut UnitGroup, task: TaskRef, name: Arc<str>) {
        let root = self.trigger.root().clone();
        let subs = Arc::clone(&self.subs);
        let run_id = self.run_id;
        let timeout = self.stop_timeout;
        let span = info_span!("stop_unit", task = %name, %run_id);

        group.spawn_for(
            Arc::clone(&name),
            Phase::Stop,
            async move {
                root.cancelled().await;

                let ctx = StopContext::new(Arc::clone(&name), run_id, timeout);
                let _release = ctx.token().drop_guard();
                subs.emit(
                    &Event::new(EventKind::TaskStopping)
                        .with_task(Arc::clone(&name))
                        .with_run(run_id)
                        .with_timeout(timeout),
                );
                debug!(?timeout, "stopping task");

                let stop = AssertUnwindSafe(task.on_stop(ctx.clone())).catch_unwind();
                let outcome = tokio::select! {
                    biased;
                    res = stop => Some(res),
                    _ = time::sleep_until(ctx.deadline()) => None,
                };

                match outcome {
                    Some(Ok(Ok(()))) | Some(Ok(Err(TaskError::Canceled))) => {
                        subs.emit(
                            &Event::new(EventKind::TaskStopped)
                                .with_task(name)
                                .with_run(run_id),
                        );
                        debug!("task stopped");
                        Ok(())
                    }
                    Some(Ok(Err(e))) => {
                        subs.emit(
                            &Event::new(EventKind::TaskStopFailed)
                                .with_task(Arc::clone(&name))
                                .with_run(run_id)
                                .with_reason(e.to_string()),
                        );
                        warn!(error = %e, "task failed to stop");
                        Err(RuntimeError::StopFailed {
                            task: name.to_string(),
                            source: e,
                        })
                    }
                    Some(Err(panic)) => {
                        let reason = format!("panicked: {}", panic_message(panic.as_ref()));
                        subs.emit(
                            &Event::new(EventKind::TaskStopFailed)
                                .with_task(Arc::clone(&name))
                                .with_run(run_id)
                                .with_reason(reason.as_str()),
                        );
                        error!(error = %reason, "stop unit panicked");
                        Err(RuntimeError::UnitPanicked {
                            task: name.to_string(),
                            phase: Phase::Stop,
                        })
                    }
                    None => {
                        ctx.expire();
                        subs.emit(
                            &Event::new(EventKind::StopDeadlineExceeded)
                                .with_task(Arc::clone(&name))
                                .with_run(run_id)
                                .with_timeout(timeout),
                        );
                        warn!(?timeout, "task did not stop before its deadline; abandoning");
                        Err(RuntimeError::StopFailed {
                            task: name.to_string(),
                            source: TaskError::DeadlineExceeded { timeout },
                        })
                    }
                }
            }
            .instrument(span),
        );
    }
}
