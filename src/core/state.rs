//! Lifecycle state of an orchestrator run.
//!
//! ```text
//! Idle ──start()──► Running ──cancellation──► Stopping ──all units returned──► Terminated
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Observable lifecycle state of an [`Orchestrator`](crate::Orchestrator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum State {
    /// Built, `start()` not called yet.
    Idle = 0,
    /// Units spawned, no shutdown requested.
    Running = 1,
    /// Shutdown requested; stop phases in progress.
    Stopping = 2,
    /// Every unit returned; `start()` has (or is about to) return.
    Terminated = 3,
}

impl State {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => State::Idle,
            1 => State::Running,
            2 => State::Stopping,
            _ => State::Terminated,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            State::Idle => "idle",
            State::Running => "running",
            State::Stopping => "stopping",
            State::Terminated => "terminated",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Which of a task's two units a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The unit running [`Task::on_start`](crate::Task::on_start).
    Start,
    /// The unit running [`Task::on_stop`](crate::Task::on_stop).
    Stop,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Start => f.write_str("start"),
            Phase::Stop => f.write_str("stop"),
        }
    }
}

/// Atomic holder for [`State`].
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(State::Idle as u8))
    }

    pub(crate) fn get(&self) -> State {
        State::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves `from → to`; returns `false` (and changes nothing) if the current state is not `from`.
    pub(crate) fn advance(&self, from: State, to: State) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn set(&self, to: State) {
        self.0.store(to as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_only_from_expected_state() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), State::Idle);
        assert!(cell.advance(State::Idle, State::Running));
        assert!(!cell.advance(State::Idle, State::Running));
        assert_eq!(cell.get(), State::Running);

        cell.set(State::Terminated);
        assert!(!cell.advance(State::Running, State::Stopping));
        assert_eq!(cell.get(), State::Terminated);
    }
}
