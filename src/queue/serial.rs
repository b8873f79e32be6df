//! # SerialQueue: single-worker execution lane.
//!
//! All side effects of the core (API calls, flow recording, bootstrap) run here,
//! one at a time, in submission order.
//!
//! ## Architecture
//! ```text
//! submit(task) ──► [bounded mpsc] ──► worker ──► task.spawn(ctx).await
//!   (try_send,                          │          ├─ Ok        → trace
//!    never blocks)                      │          ├─ Err(e)    → warn + TaskFailed
//!                                       │          └─ panic     → error + TaskPanicked
//!                                       └─ token cancelled → exit (queued tasks abandoned)
//! ```
//!
//! ## Rules
//! - At most **one** task in flight; the next task starts only after the previous future resolves.
//! - Tasks run **exactly once**, in FIFO order.
//! - A failing or panicking task never stops the worker.
//! - [`SerialQueue::stop`] does **not** drain: queued tasks are abandoned and the
//!   in-flight task is aborted at its next await point.
//! - A task must never wait on another task submitted to the same queue (the
//!   sole worker would deadlock).

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use crate::error::{SubmitError, TaskError};
use crate::events::{Bus, Event, EventKind};
use crate::tasks::TaskBox;

/// Single-worker FIFO task queue.
pub struct SerialQueue {
    tx: mpsc::Sender<TaskBox>,
    token: CancellationToken,
    worker: JoinHandle<()>,
}

impl SerialQueue {
    /// Creates the queue and spawns its worker on the current tokio runtime.
    pub fn start(capacity: usize, bus: Bus) -> Self {
        let (tx, rx) = mpsc::channel::<TaskBox>(capacity.max(1));
        let token = CancellationToken::new();
        let worker = tokio::spawn(drain(rx, token.clone(), bus));
        debug!(capacity, "serialized queue started");
        Self { tx, token, worker }
    }

    /// Enqueues `task` without waiting.
    pub fn submit(&self, task: TaskBox) -> Result<(), SubmitError> {
        if self.token.is_cancelled() {
            return Err(SubmitError::Closed);
        }
        self.tx.try_send(task).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SubmitError::Full,
            mpsc::error::TrySendError::Closed(_) => SubmitError::Closed,
        })
    }

    /// Returns `true` once [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Discards the queue: outstanding tasks are abandoned, not awaited.
    pub fn stop(self) {
        self.token.cancel();
        self.worker.abort();
        debug!("serialized queue stopped");
    }
}

/// Worker loop: one task at a time until cancelled or all senders are gone.
async fn drain(mut rx: mpsc::Receiver<TaskBox>, token: CancellationToken, bus: Bus) {
    loop {
        let task = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            next = rx.recv() => match next {
                Some(task) => task,
                None => break,
            },
        };
        if token.is_cancelled() {
            break;
        }

        let name: Arc<str> = Arc::from(task.name());
        let fut = task.spawn(token.child_token());

        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(())) => trace!(task = %name, "task done"),
            Ok(Err(TaskError::Canceled)) => debug!(task = %name, "task canceled"),
            Ok(Err(e)) => {
                if matches!(e, TaskError::Bootstrap { .. }) {
                    error!(task = %name, label = e.as_label(), error = %e, "bootstrap failed; core stays unconfigured");
                } else {
                    warn!(task = %name, label = e.as_label(), error = %e, "task failed");
                }
                bus.publish(
                    Event::new(EventKind::TaskFailed)
                        .with_task(name)
                        .with_reason(e.to_string()),
                );
            }
            Err(panic_err) => {
                let info = if let Some(msg) = panic_err.downcast_ref::<&'static str>() {
                    (*msg).to_string()
                } else if let Some(msg) = panic_err.downcast_ref::<String>() {
                    msg.clone()
                } else {
                    "unknown panic".to_string()
                };
                error!(task = %name, panic = %info, "task panicked");
                bus.publish(
                    Event::new(EventKind::TaskPanicked)
                        .with_task(name)
                        .with_reason(info),
                );
            }
        }
    }
    trace!("serialized queue worker exited");
}
