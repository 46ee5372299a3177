//! # Fan-in group: N units, one shared cancel, first error wins.
//!
//! ```text
//! spawn(unit_1) ─┐
//! spawn(unit_2) ─┼──► JoinSet ──► wait(): join all ──► first error (or Ok)
//! spawn(unit_N) ─┘        │
//!                         └─ unit returns Err ──► slot (first wins) + root.cancel()
//! ```
//!
//! ## Rules
//! - The slot keeps the error of the **first unit to report**, not of the first spawned.
//! - Any reported error cancels the shared token.
//! - `wait()` returns only after every spawned unit has returned.
//! - A task unit that panics outside its own catch still reports `UnitPanicked` for its task.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::{self, AbortHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::core::state::Phase;
use crate::error::RuntimeError;

/// Write-once-effective error slot shared by all units.
#[derive(Debug, Default)]
struct FirstError(Mutex<Option<RuntimeError>>);

impl FirstError {
    /// Stores `err` if the slot is empty; returns whether it won.
    fn offer(&self, err: RuntimeError) -> bool {
        let mut slot = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            debug!(error = %err, "discarding error; an earlier one already won");
            return false;
        }
        *slot = Some(err);
        true
    }

    fn take(&self) -> Option<RuntimeError> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

/// Concurrent units sharing one cancellation token and one error slot.
pub(crate) struct UnitGroup {
    set: JoinSet<()>,
    token: CancellationToken,
    first: Arc<FirstError>,
    owners: HashMap<task::Id, (Arc<str>, Phase)>,
}

impl UnitGroup {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self {
            set: JoinSet::new(),
            token,
            first: Arc::new(FirstError::default()),
            owners: HashMap::new(),
        }
    }

    /// Spawns a unit not tied to any task. An `Err` it returns is offered to the slot and
    /// cancels the token.
    pub(crate) fn spawn<F>(&mut self, unit: F)
    where
        F: Future<Output = Result<(), RuntimeError>> + Send + 'static,
    {
        self.spawn_inner(unit);
    }

    /// Spawns the `phase` unit of `task`.
    pub(crate) fn spawn_for<F>(&mut self, task: Arc<str>, phase: Phase, unit: F)
    where
        F: Future<Output = Result<(), RuntimeError>> + Send + 'static,
    {
        let handle = self.spawn_inner(unit);
        self.owners.insert(handle.id(), (task, phase));
    }

    fn spawn_inner<F>(&mut self, unit: F) -> AbortHandle
    where
        F: Future<Output = Result<(), RuntimeError>> + Send + 'static,
    {
        let first = Arc::clone(&self.first);
        let token = self.token.clone();

        self.set.spawn(async move {
            if let Err(err) = unit.await {
                first.offer(err);
                token.cancel();
            }
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.set.len()
    }

    /// Waits for every unit, then returns the winning error, if any.
    pub(crate) async fn wait(mut self) -> Result<(), RuntimeError> {
        while let Some(joined) = self.set.join_next_with_id().await {
            let Err(e) = joined else { continue };
            if !e.is_panic() {
                debug!(error = %e, "unit did not run to completion");
                continue;
            }
            match self.owners.get(&e.id()) {
                Some((task, phase)) => {
                    error!(task = %task, %phase, "unit panicked");
                    self.first.offer(RuntimeError::UnitPanicked {
                        task: task.to_string(),
                        phase: *phase,
                    });
                }
                None => error!(error = %e, "coordination unit panicked"),
            }
            self.token.cancel();
        }
        match self.first.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::TaskError;

    fn stop_failed(task: &str) -> RuntimeError {
        RuntimeError::StopFailed {
            task: task.into(),
            source: TaskError::fail("boom"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_reported_error_wins_regardless_of_spawn_order() {
        let token = CancellationToken::new();
        let mut group = UnitGroup::new(token.clone());

        group.spawn(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Err(stop_failed("late"))
        });
        group.spawn(async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err(stop_failed("early"))
        });
        group.spawn(async { Ok(()) });
        assert_eq!(group.len(), 3);

        let err = group.wait().await.unwrap_err();
        assert_eq!(err.task(), Some("early"));
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn escaped_panic_is_attributed_to_its_task() {
        let token = CancellationToken::new();
        let mut group = UnitGroup::new(token.clone());

        fn explode() -> Result<(), RuntimeError> {
            panic!("deadline arithmetic")
        }

        group.spawn_for(Arc::from("db"), Phase::Stop, async { explode() });
        group.spawn_for(Arc::from("db"), Phase::Start, async { Ok(()) });

        let err = group.wait().await.unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::UnitPanicked { ref task, phase: Phase::Stop } if task == "db"
        ));
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn all_ok_leaves_token_alone() {
        let token = CancellationToken::new();
        let mut group = UnitGroup::new(token.clone());
        group.spawn(async { Ok(()) });
        group.spawn(async { Ok(()) });

        assert!(group.wait().await.is_ok());
        assert!(!token.is_cancelled());
    }

    #[test]
    fn panic_payloads_are_readable() {
        let static_msg: Box<dyn Any + Send> = Box::new("static");
        let owned_msg: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn Any + Send> = Box::new(7_u8);

        assert_eq!(panic_message(static_msg.as_ref()), "static");
        assert_eq!(panic_message(owned_msg.as_ref()), "owned");
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
