//! Runtime events.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publishers**: the coordination unit (`ShutdownRequested`), start/stop units
//!   (task events), `Orchestrator::start` (`AllStopped`).
//! - **Consumers**: user [`Subscribe`](crate::Subscribe) implementations, fed through
//!   the orchestrator's per-subscriber queues.

mod event;

pub use event::{Event, EventKind};
