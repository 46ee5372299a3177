//! # Example: basic
//!
//! Two long-running tasks, stopped by Ctrl-C / `SIGTERM` / `SIGQUIT`.
//!
//! Demonstrates how to:
//! - Define tasks with [`TaskFn`] and a stop closure.
//! - Honor the [`StopContext`] deadline while draining.
//! - Run them under an [`Orchestrator`] until a signal arrives.
//!
//! ## Flow
//! ```text
//! Orchestrator::start()
//!     ├─► on_start(ticker) / on_start(server)
//!     ├─► ...Ctrl-C...
//!     ├─► root.cancel()
//!     ├─► on_stop(ticker) ┐ concurrently,
//!     ├─► on_stop(server) ┘ each bounded by stop_timeout
//!     └─► Ok(())
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic
//! # then press Ctrl-C
//! ```

use std::time::Duration;

use stopgate::{Orchestrator, StopContext, TaskError, TaskFn, TaskRef};
use tokio_util::sync::CancellationToken;

fn ticker() -> TaskRef {
    TaskFn::arc("ticker", |ctx: CancellationToken| async move {
        let mut tick = 0u64;
        loop {
            tokio::select! {
                _ = ctx.cancelled() => return Ok::<_, TaskError>(()),
                _ = tokio::time::sleep(Duration::from_secs(1)) => {
                    tick += 1;
                    println!("[ticker] tick {tick}");
                }
            }
        }
    })
}

fn server() -> TaskRef {
    TaskFn::new("server", |ctx: CancellationToken| async move {
        println!("[server] listening");
        ctx.cancelled().await;
        Ok::<_, TaskError>(())
    })
    .with_stop(|ctx: StopContext| async move {
        println!("[server] draining (budget {:?})", ctx.remaining());
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(300)) => {
                println!("[server] drained");
                Ok(())
            }
            _ = ctx.expired() => Err(TaskError::DeadlineExceeded { timeout: ctx.timeout() }),
        }
    })
    .critical(true)
    .into_ref()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = Orchestrator::builder()
        .with_stop_timeout(Duration::from_secs(5))
        .add_tasks([ticker(), server()])
        .build();

    println!("running {:?}; press Ctrl-C to stop", orchestrator.task_names());
    orchestrator.start().await?;
    println!("all tasks stopped");
    Ok(())
}
