//! # Example: critical_failure
//!
//! A critical task fails during startup; the whole set shuts down and `start()` returns the
//! failure. A slow teardown that overruns its budget is abandoned.
//!
//! ## Flow
//! ```text
//! on_start(database) ──► Err(Fatal)   (critical)
//!     └─► root.cancel()
//!           ├─► on_stop(database)
//!           ├─► on_stop(cache)     ── overruns 1s budget ──► abandoned
//!           └─► start() ──► Err(StartFailed { task: "database", .. })
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example critical_failure
//! ```

use std::time::Duration;

use stopgate::{Orchestrator, RuntimeError, StopContext, TaskError, TaskFn};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let database = TaskFn::new("database", |_ctx: CancellationToken| async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Err::<(), _>(TaskError::fatal("connection refused"))
    })
    .critical(true)
    .into_ref();

    let cache = TaskFn::new("cache", |ctx: CancellationToken| async move {
        ctx.cancelled().await;
        Ok::<_, TaskError>(())
    })
    .with_stop(|_ctx: StopContext| async move {
        // Ignores its deadline on purpose.
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    })
    .into_ref();

    let orchestrator = Orchestrator::builder()
        .with_stop_timeout(Duration::from_secs(1))
        .add_tasks([database, cache])
        .build();

    match orchestrator.start().await {
        Err(RuntimeError::StartFailed { task, source }) => {
            println!("startup aborted by {task}: {source}");
            Ok(())
        }
        Err(e) => Err(e.into()),
        Ok(()) => anyhow::bail!("expected a critical failure"),
    }
}
