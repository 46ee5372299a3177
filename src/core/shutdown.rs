//! # Shutdown triggers and the coordination unit.
//!
//! Every way of asking the orchestrator to stop ends in one place: cancelling the
//! root [`CancellationToken`]. The first recorded [`ShutdownCause`] wins.
//!
//! ```text
//! Orchestrator::stop() ───────────┐
//! OrchestratorHandle::stop() ─────┼──► ShutdownTrigger::request(cause) ──► root.cancel()
//! coordination unit (OS signal) ──┘                                          ▲    │
//! critical start failure ──► note(CriticalFailure) ──► UnitGroup stores err ─┘    ▼
//!                                                                  every stop unit wakes
//! ```
//!
//! ## Signals
//! Signal delivery is abstracted behind [`ShutdownSource`]:
//! - [`OsSignals`] (default) subscribes to real OS signals at `start()` time.
//!   **Unix:** `SIGINT`, `SIGTERM`, `SIGQUIT` (as configured). **Windows:** Ctrl-C only.
//! - [`ManualShutdown`] is a cloneable in-process trigger for tests and embedding.

use std::fmt;
use std::io;
use std::sync::{Arc, OnceLock};

use futures::future::{self, BoxFuture};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::state::{State, StateCell};
use crate::events::{Event, EventKind};
use crate::subscribers::SubscriberSet;

/// Termination-style OS signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// `SIGINT` / Ctrl-C.
    Interrupt,
    /// `SIGTERM`.
    Terminate,
    /// `SIGQUIT`.
    Quit,
}

impl Signal {
    /// The default shutdown signal set.
    pub const TERMINATION: [Signal; 3] = [Signal::Interrupt, Signal::Terminate, Signal::Quit];

    /// Conventional signal name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::Quit => "SIGQUIT",
        }
    }

    #[cfg(unix)]
    fn kind(self) -> tokio::signal::unix::SignalKind {
        use tokio::signal::unix::SignalKind;

        match self {
            Signal::Interrupt => SignalKind::interrupt(),
            Signal::Terminate => SignalKind::terminate(),
            Signal::Quit => SignalKind::quit(),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why shutdown began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownCause {
    /// [`Orchestrator::stop`](crate::Orchestrator::stop) or a handle's `stop()`.
    Explicit,
    /// A signal from the [`ShutdownSource`].
    Signal(Signal),
    /// A critical task's start operation failed.
    CriticalFailure {
        /// Name of the failed task.
        task: Arc<str>,
    },
}

impl fmt::Display for ShutdownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownCause::Explicit => f.write_str("explicit stop"),
            ShutdownCause::Signal(sig) => write!(f, "signal {sig}"),
            ShutdownCause::CriticalFailure { task } => write!(f, "critical task {task} failed"),
        }
    }
}

/// Future completing with the first received signal, or `None` if the source closed.
pub type ShutdownListener = BoxFuture<'static, Option<Signal>>;

/// Source of "shutdown requested" events.
///
/// `listen` is called once per run, at `start()`, inside the tokio runtime. Registration errors
/// must be returned from `listen` itself so that `start()` fails before any task runs.
pub trait ShutdownSource: Send + Sync + 'static {
    /// Subscribes to `signals` and returns a listener for the first one delivered.
    fn listen(&self, signals: &[Signal]) -> io::Result<ShutdownListener>;
}

/// Real OS signal delivery (via `tokio::signal`).
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSignals;

impl ShutdownSource for OsSignals {
    #[cfg(unix)]
    fn listen(&self, signals: &[Signal]) -> io::Result<ShutdownListener> {
        use tokio::signal::unix::signal;

        let mut streams = Vec::with_capacity(signals.len());
        for &sig in signals {
            streams.push((sig, signal(sig.kind())?));
        }

        Ok(Box::pin(async move {
            if streams.is_empty() {
                return None;
            }
            let waits = streams.iter_mut().map(|(sig, stream)| {
                Box::pin(async move {
                    stream.recv().await;
                    *sig
                })
            });
            let (sig, _, _) = future::select_all(waits).await;
            Some(sig)
        }))
    }

    #[cfg(not(unix))]
    fn listen(&self, signals: &[Signal]) -> io::Result<ShutdownListener> {
        if !signals.contains(&Signal::Interrupt) {
            return Ok(Box::pin(future::ready(None)));
        }
        Ok(Box::pin(async {
            tokio::signal::ctrl_c().await.ok().map(|()| Signal::Interrupt)
        }))
    }
}

/// In-process signal source.
///
/// [`trigger`](ManualShutdown::trigger) may be called before or during a run. Signals not in
/// the orchestrator's configured set are ignored, like an unsubscribed OS signal.
///
/// ## Example
/// ```rust
/// use stopgate::{ManualShutdown, Signal};
///
/// let source = ManualShutdown::new();
/// let remote = source.clone();
/// remote.trigger(Signal::Terminate);
/// assert_eq!(source.last(), Some(Signal::Terminate));
/// ```
#[derive(Debug, Clone)]
pub struct ManualShutdown {
    tx: Arc<watch::Sender<Option<Signal>>>,
}

impl ManualShutdown {
    /// Creates a source with no pending signal.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Delivers `sig` to every current and future listener.
    pub fn trigger(&self, sig: Signal) {
        self.tx.send_replace(Some(sig));
    }

    /// The most recently delivered signal.
    pub fn last(&self) -> Option<Signal> {
        *self.tx.borrow()
    }
}

impl Default for ManualShutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSource for ManualShutdown {
    fn listen(&self, signals: &[Signal]) -> io::Result<ShutdownListener> {
        let mut rx = self.tx.subscribe();
        let accepted = signals.to_vec();

        Ok(Box::pin(async move {
            let seen = rx
                .wait_for(|sig| sig.is_some_and(|s| accepted.contains(&s)))
                .await
                .ok()?;
            *seen
        }))
    }
}

/// Shared owner of the root token and the first shutdown cause.
#[derive(Debug)]
pub(crate) struct ShutdownTrigger {
    root: CancellationToken,
    cause: OnceLock<ShutdownCause>,
}

impl ShutdownTrigger {
    pub(crate) fn new() -> Self {
        Self {
            root: CancellationToken::new(),
            cause: OnceLock::new(),
        }
    }

    pub(crate) fn root(&self) -> &CancellationToken {
        &self.root
    }

    /// Records `cause` (only the first caller's is kept) and cancels the root.
    ///
    /// Safe from any number of concurrent callers.
    pub(crate) fn request(&self, cause: ShutdownCause) {
        self.note(cause);
        self.root.cancel();
    }

    /// Records `cause` without cancelling; the caller cancels once its error is stored.
    pub(crate) fn note(&self, cause: ShutdownCause) -> bool {
        let shown = cause.to_string();
        let first = self.cause.set(cause).is_ok();
        if first {
            debug!(cause = %shown, "shutdown requested");
        } else {
            debug!(cause = %shown, "shutdown already requested");
        }
        first
    }

    pub(crate) fn cause(&self) -> Option<&ShutdownCause> {
        self.cause.get()
    }

    pub(crate) fn is_requested(&self) -> bool {
        self.root.is_cancelled()
    }
}

/// The coordination unit: bridges the shutdown listener into the root token.
///
/// Returns once the root is cancelled, by whatever cause. Moves the state to
/// [`State::Stopping`] and emits exactly one `ShutdownRequested` event.
pub(crate) async fn coordinate(
    listener: ShutdownListener,
    trigger: Arc<ShutdownTrigger>,
    state: Arc<StateCell>,
    subs: Arc<SubscriberSet>,
) {
    tokio::select! {
        _ = trigger.root().cancelled() => {}
        sig = listener => match sig {
            Some(sig) => {
                info!(signal = %sig, "received shutdown signal");
                trigger.request(ShutdownCause::Signal(sig));
            }
            None => {
                debug!("shutdown source closed; waiting for stop or failure");
                trigger.root().cancelled().await;
            }
        },
    }

    state.advance(State::Running, State::Stopping);

    let cause = trigger
        .cause()
        .cloned()
        .unwrap_or(ShutdownCause::Explicit);
    info!(%cause, "shutting down");
    subs.emit(&Event::new(EventKind::ShutdownRequested).with_cause(cause));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn manual_source_delivers_configured_signal() {
        let source = ManualShutdown::new();
        let listener = source.listen(&[Signal::Terminate]).unwrap();
        source.trigger(Signal::Terminate);
        assert_eq!(listener.await, Some(Signal::Terminate));
    }

    #[tokio::test(start_paused = true)]
    async fn manual_source_ignores_unsubscribed_signal() {
        let source = ManualShutdown::new();
        let listener = source.listen(&[Signal::Quit]).unwrap();
        source.trigger(Signal::Interrupt);

        let waited = tokio::time::timeout(std::time::Duration::from_secs(1), listener).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn manual_source_sees_signal_sent_before_listen() {
        let source = ManualShutdown::new();
        source.trigger(Signal::Interrupt);
        let listener = source.listen(&Signal::TERMINATION).unwrap();
        assert_eq!(listener.await, Some(Signal::Interrupt));
    }

    #[test]
    fn first_cause_wins() {
        let trigger = ShutdownTrigger::new();
        assert!(!trigger.is_requested());

        trigger.request(ShutdownCause::Signal(Signal::Quit));
        trigger.request(ShutdownCause::Explicit);

        assert!(trigger.is_requested());
        assert_eq!(trigger.cause(), Some(&ShutdownCause::Signal(Signal::Quit)));
    }
}
