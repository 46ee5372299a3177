//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for observing a run: lifecycle logging,
//! metrics, or surfacing non-critical start failures that the orchestrator otherwise swallows.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics are caught and logged)
//!
//! ## Rules
//! - A slow subscriber only affects its own queue.
//! - Queue overflow drops the event **for this subscriber only** (logged at `warn`).
//! - Events are processed sequentially (FIFO) per subscriber.
//! - All queued events are delivered before `start()` returns.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use stopgate::{Event, EventKind, Subscribe};
//!
//! struct FailureAudit;
//!
//! #[async_trait]
//! impl Subscribe for FailureAudit {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::TaskStartFailed && ev.critical == Some(false) {
//!             // page someone, bump a counter...
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-audit" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for runtime observability.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, not in the publisher context.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in overflow/panic logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber (clamped to at least 1).
    ///
    /// Default: 256.
    fn queue_capacity(&self) -> usize {
        256
    }
}
