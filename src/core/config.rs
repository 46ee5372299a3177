//! # Orchestrator configuration.
//!
//! Provides [`Config`] centralized settings for one [`Orchestrator`](crate::Orchestrator).
//!
//! ## Sentinel values
//! - `stop_timeout = 0s` → every stop context is born expired (no graceful window)
//! - `signals = []` → OS signals are ignored; only [`Orchestrator::stop`](crate::Orchestrator::stop)
//!   and critical failures trigger shutdown

use std::time::Duration;

use crate::core::shutdown::Signal;

/// Default graceful-stop budget granted to each task.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the orchestrator runtime.
///
/// ## Field semantics
/// - `stop_timeout`: maximum time each task's stop phase may take, counted from the moment
///   that task's stop unit observes shutdown
/// - `signals`: OS signals that trigger shutdown (duplicates are ignored)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Per-task stop budget.
    pub stop_timeout: Duration,

    /// Signals the shutdown source listens for.
    pub signals: Vec<Signal>,
}

impl Config {
    /// Returns the configured signals with duplicates removed, in first-seen order.
    pub fn signal_set(&self) -> Vec<Signal> {
        let mut set = Vec::with_capacity(self.signals.len());
        for sig in &self.signals {
            if !set.contains(sig) {
                set.push(*sig);
            }
        }
        set
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `stop_timeout = 60s`
    /// - `signals = [Interrupt, Terminate, Quit]`
    fn default() -> Self {
        Self {
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            signals: Signal::TERMINATION.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.stop_timeout, Duration::from_secs(60));
        assert_eq!(
            cfg.signals,
            vec![Signal::Interrupt, Signal::Terminate, Signal::Quit]
        );
    }

    #[test]
    fn signal_set_drops_duplicates() {
        let cfg = Config {
            signals: vec![Signal::Quit, Signal::Interrupt, Signal::Quit],
            ..Config::default()
        };
        assert_eq!(cfg.signal_set(), vec![Signal::Quit, Signal::Interrupt]);
    }
}
