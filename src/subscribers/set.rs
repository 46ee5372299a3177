//! # Non-blocking event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`] — distributes events to multiple subscribers
//! concurrently without blocking the start/stop units that publish them.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → tracing::warn!
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!     │    (bounded)
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//!          (bounded)
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process event N while B processes N+5
//! - **Overflow**: event dropped for that subscriber only, logged at `warn`
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Isolation**: slow/panicking subscriber doesn't affect others
//! - **Per-subscriber FIFO**: each subscriber sees events in order
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::warn;

use crate::core::panic_message;
use crate::events::Event;
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for multiple event subscribers.
pub(crate) struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        warn!(
                            subscriber = sub.name(),
                            info = %panic_message(panic.as_ref()),
                            "subscriber panicked"
                        );
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self { channels, workers }
    }

    /// A set with no subscribers; `emit` is a no-op.
    pub fn empty() -> Self {
        Self {
            channels: Vec::new(),
            workers: Vec::new(),
        }
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// `true` if there are no subscribers.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Emits an event to all subscribers.
    ///
    /// - Uses `try_send` (non-blocking)
    /// - On queue full or closed: drops the event for that subscriber and logs it
    pub fn emit(&self, event: &Event) {
        if self.is_empty() {
            return;
        }
        let event = Arc::new(event.clone());

        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(
                        subscriber = channel.name,
                        kind = event.kind.as_label(),
                        "subscriber queue full; event dropped"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    warn!(
                        subscriber = channel.name,
                        kind = event.kind.as_label(),
                        "subscriber closed; event dropped"
                    );
                }
            }
        }
    }

    /// Gracefully shuts down all subscriber workers.
    ///
    /// 1. Drops all channel senders (workers drain their queues, then see channel closed)
    /// 2. Awaits all worker tasks to finish
    pub async fn shutdown(self) {
        drop(self.channels);

        for h in self.workers {
            let _ = h.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::events::EventKind;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Panicky;

    #[async_trait]
    impl Subscribe for Panicky {
        async fn on_event(&self, _event: &Event) {
            panic!("boom");
        }
    }

    #[tokio::test]
    async fn delivers_in_order_and_drains_on_shutdown() {
        let rec = Arc::new(Recorder::default());
        let subs: Vec<Arc<dyn Subscribe>> =
            vec![rec.clone() as Arc<dyn Subscribe>, Arc::new(Panicky)];
        let set = SubscriberSet::new(subs);
        assert_eq!(set.len(), 2);

        set.emit(&Event::new(EventKind::TaskStarting));
        set.emit(&Event::new(EventKind::TaskStopping));
        set.emit(&Event::new(EventKind::TaskStopped));
        set.shutdown().await;

        assert_eq!(
            *rec.seen.lock().unwrap(),
            vec![
                EventKind::TaskStarting,
                EventKind::TaskStopping,
                EventKind::TaskStopped
            ]
        );
    }

    #[test]
    fn empty_set_ignores_events() {
        let set = SubscriberSet::empty();
        assert!(set.is_empty());
        set.emit(&Event::new(EventKind::AllStopped));
    }
}
