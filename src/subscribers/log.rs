//! # LogWriter — lifecycle events to `tracing`
//!
//! A minimal subscriber that forwards incoming [`Event`]s to `tracing` records under the
//! `stopgate::events` target. Install any `tracing` subscriber to see them.
//!
//! ## Example output (with `tracing_subscriber::fmt`)
//! ```text
//! INFO  stopgate::events: starting task="db" critical=true
//! WARN  stopgate::events: start-failed task="metrics" critical=false err="bind: in use"
//! INFO  stopgate::events: shutdown-requested cause=signal SIGTERM
//! INFO  stopgate::events: stopping task="db" timeout_ms=60000
//! INFO  stopgate::events: stopped task="db"
//! WARN  stopgate::events: stop-deadline-exceeded task="cache" timeout_ms=60000
//! INFO  stopgate::events: all-stopped
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

const TARGET: &str = "stopgate::events";

/// Event writer subscriber.
#[derive(Debug, Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let label = e.kind.as_label();
        let task = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::ShutdownRequested => {
                let cause = e.cause.as_ref().map(ToString::to_string);
                tracing::info!(target: TARGET, cause = cause.as_deref().unwrap_or("-"), "{label}");
            }
            EventKind::AllStopped => match &e.reason {
                Some(err) => tracing::warn!(target: TARGET, err = %err, "{label}"),
                None => tracing::info!(target: TARGET, "{label}"),
            },
            EventKind::TaskStarting => {
                tracing::info!(target: TARGET, task, critical = e.critical, "{label}");
            }
            EventKind::TaskStartFailed => {
                tracing::warn!(target: TARGET, task, critical = e.critical, err = reason, "{label}");
            }
            EventKind::TaskStopping => {
                tracing::info!(target: TARGET, task, timeout_ms = e.timeout_ms, "{label}");
            }
            EventKind::TaskStopped => {
                tracing::info!(target: TARGET, task, "{label}");
            }
            EventKind::TaskStopFailed => {
                tracing::warn!(target: TARGET, task, err = reason, "{label}");
            }
            EventKind::StopDeadlineExceeded => {
                tracing::warn!(target: TARGET, task, timeout_ms = e.timeout_ms, "{label}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
