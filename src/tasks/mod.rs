//! # Task abstractions.
//!
//! - [`Task`] - trait for one-shot queued work
//! - [`TaskFn`] - closure-based task implementation
//! - [`TaskBox`] - owned, type-erased task (`Box<dyn Task>`)

mod task;
mod task_fn;

pub use task::{BoxTaskFuture, Task, TaskBox};
pub use task_fn::TaskFn;
