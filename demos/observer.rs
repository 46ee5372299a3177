//! # Example: observer
//!
//! Attaches the built-in [`LogWriter`] plus a custom [`Subscribe`] implementation, so that
//! swallowed non-critical failures and stop progress become visible.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example observer --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use stopgate::{Event, EventKind, LogWriter, Orchestrator, Subscribe, TaskError, TaskFn, TaskRef};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Counts failures that never reach `start()`'s result.
#[derive(Default)]
struct FailureCounter {
    swallowed: AtomicUsize,
}

#[async_trait::async_trait]
impl Subscribe for FailureCounter {
    async fn on_event(&self, ev: &Event) {
        if ev.kind == EventKind::TaskStartFailed && ev.critical == Some(false) {
            let n = self.swallowed.fetch_add(1, Ordering::Relaxed) + 1;
            println!(
                "[counter] swallowed failure #{n}: task={} reason={}",
                ev.task.as_deref().unwrap_or("<unknown>"),
                ev.reason.as_deref().unwrap_or("<none>")
            );
        }
    }

    fn name(&self) -> &'static str {
        "failure-counter"
    }
}

fn idle(name: &'static str) -> TaskRef {
    TaskFn::arc(name, |ctx: CancellationToken| async move {
        ctx.cancelled().await;
        Ok::<_, TaskError>(())
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let metrics = TaskFn::new("metrics", |_ctx: CancellationToken| async move {
        Err::<(), _>(TaskError::fail("exporter endpoint not configured"))
    })
    .into_ref();

    let counter = Arc::new(FailureCounter::default());
    let orchestrator = Orchestrator::builder()
        .with_stop_timeout(Duration::from_secs(2))
        .add_tasks([idle("api"), idle("worker"), metrics])
        .with_subscribers(vec![
            Arc::new(LogWriter::default()) as Arc<dyn Subscribe>,
            Arc::clone(&counter) as Arc<dyn Subscribe>,
        ])
        .build();

    let handle = orchestrator.handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.stop();
    });

    orchestrator.start().await?;
    println!(
        "done; {} non-critical failure(s) observed",
        counter.swallowed.load(Ordering::Relaxed)
    );
    Ok(())
}
