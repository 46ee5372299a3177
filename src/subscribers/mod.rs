//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the internal `SubscriberSet` fan-out used by
//! the orchestrator to deliver [`Event`](crate::Event)s.
//!
//! ## Architecture
//! ```text
//! start/stop units ── emit(Event) ──► SubscriberSet ──► per-subscriber queue ──► Subscribe::on_event
//!                                                                                  │
//!                                                                 ┌────────────────┼──────────┐
//!                                                                 ▼                ▼          ▼
//!                                                             LogWriter         Metrics    Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub(crate) use set::SubscriberSet;
pub use subscribe::Subscribe;
