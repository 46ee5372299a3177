//! # Task abstractions.
//!
//! - [`Task`] - trait every managed background task implements
//! - [`TaskFn`] - function-backed task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)

mod task;
mod task_fn;

pub use task::{Task, TaskRef};
pub use task_fn::TaskFn;
