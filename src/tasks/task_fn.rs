//! # Closure-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: FnOnce(CancellationToken) -> Fut`. Listeners
//! capture the event payload and the collaborators they need by value, so a
//! task owns everything it touches and no state is shared between tasks
//! except through the collaborators themselves.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use kegcore::{TaskBox, TaskError, TaskFn};
//!
//! let t: TaskBox = TaskFn::boxed("meter-update", |_ctx: CancellationToken| async move {
//!     Ok::<_, TaskError>(())
//! });
//! assert_eq!(t.name(), "meter-update");
//! ```

use std::borrow::Cow;
use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::{BoxTaskFuture, Task};

/// Function-backed one-shot task.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the task already boxed for submission.
    pub fn boxed<Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Box<Self>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Box::new(Self::new(name, f))
    }
}

impl<F, Fut> Task for TaskFn<F>
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(self: Box<Self>, ctx: CancellationToken) -> BoxTaskFuture {
        Box::pin((self.f)(ctx))
    }
}
