//! # Task abstraction for the serialized queue.
//!
//! A [`Task`] is a named, one-shot unit of work. The queue worker consumes it
//! exactly once via [`Task::spawn`] and awaits the returned future to completion
//! before taking the next task.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Boxed future returned by [`Task::spawn`].
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// # One-shot queued unit of work.
///
/// The token handed to [`spawn`](Task::spawn) is cancelled when the queue is
/// stopped; long-running tasks may check it between steps and return
/// `Err(TaskError::Canceled)`.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use kegcore::{BoxTaskFuture, Task};
///
/// struct Ping;
///
/// impl Task for Ping {
///     fn name(&self) -> &str { "ping" }
///
///     fn spawn(self: Box<Self>, _ctx: CancellationToken) -> BoxTaskFuture {
///         Box::pin(async { Ok(()) })
///     }
/// }
/// ```
pub trait Task: Send + 'static {
    /// Returns a stable, human-readable task name (used in logs and events).
    fn name(&self) -> &str;

    /// Consumes the task and produces its future.
    fn spawn(self: Box<Self>, ctx: CancellationToken) -> BoxTaskFuture;
}

/// Owned, type-erased task as carried by the queue.
pub type TaskBox = Box<dyn Task>;
