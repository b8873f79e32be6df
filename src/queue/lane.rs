//! # Lane: the shared slot holding the current [`SerialQueue`].
//!
//! Listeners are attached before the API collaborator is bound, but the queue
//! only exists between "API connected" and "core stopped". The lane gives them
//! a stable handle across that lifecycle.
//!
//! ```text
//! HardwareListener ──┐                     ┌── Some(SerialQueue) ──► worker
//!                    ├──► Lane::submit() ──┤
//! FlowListener     ──┘                     └── None ──► drop + TaskDropped
//! ```
//!
//! ## Rules
//! - `open` replaces (and stops) any previous queue.
//! - `discard` stops the current queue without draining it.
//! - Submissions while no queue exists are dropped; the upstream event source
//!   owns buffering for events delivered during `Binding`.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use super::SerialQueue;
use crate::error::SubmitError;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::TaskBox;

/// Slot for the currently active serialized queue.
pub struct Lane {
    current: RwLock<Option<SerialQueue>>,
    capacity: usize,
    bus: Bus,
}

impl Lane {
    /// Creates an empty lane; queues created by [`Lane::open`] use `capacity`.
    pub fn new(capacity: usize, bus: Bus) -> Self {
        Self {
            current: RwLock::new(None),
            capacity,
            bus,
        }
    }

    /// Starts a fresh queue, stopping the previous one if any.
    pub fn open(&self) {
        let fresh = SerialQueue::start(self.capacity, self.bus.clone());
        if let Some(old) = self.current.write().replace(fresh) {
            debug!("replacing previous serialized queue");
            old.stop();
        }
    }

    /// Stops and forgets the current queue. Returns `false` if there was none.
    pub fn discard(&self) -> bool {
        match self.current.write().take() {
            Some(queue) => {
                queue.stop();
                true
            }
            None => false,
        }
    }

    /// Returns `true` while a running queue is installed.
    pub fn is_open(&self) -> bool {
        self.current
            .read()
            .as_ref()
            .is_some_and(|q| !q.is_stopped())
    }

    /// Submits `task` to the current queue.
    ///
    /// A rejected submission is logged and published as `TaskDropped`; callers
    /// on hardware callback threads can ignore the result.
    pub fn submit(&self, task: TaskBox) -> Result<(), SubmitError> {
        let name: Arc<str> = Arc::from(task.name());
        let res = match self.current.read().as_ref() {
            Some(queue) => queue.submit(task),
            None => Err(SubmitError::NoQueue),
        };
        if let Err(e) = res {
            self.report_drop(name, e);
        }
        res
    }

    fn report_drop(&self, task: Arc<str>, err: SubmitError) {
        match err {
            SubmitError::NoQueue => {
                debug!(task = %task, label = err.as_label(), "dropping event: no active queue")
            }
            SubmitError::Full | SubmitError::Closed => warn!(
                task = %task,
                label = err.as_label(),
                "dropping event: queue rejected submission"
            ),
        }
        self.bus.publish(
            Event::new(EventKind::TaskDropped)
                .with_task(task)
                .with_reason(err.as_label()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::tasks::TaskFn;
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::time::timeout;

    fn noop() -> TaskBox {
        TaskFn::boxed("noop", |_ctx| async { Ok::<(), TaskError>(()) })
    }

    #[tokio::test]
    async fn test_submit_without_queue_is_dropped() {
        let bus = Bus::new(8);
        let mut events = bus.subscribe();
        let lane = Lane::new(8, bus);

        assert_eq!(lane.submit(noop()), Err(SubmitError::NoQueue));
        let ev = events.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::TaskDropped);
        assert_eq!(ev.task.as_deref(), Some("noop"));
        assert_eq!(ev.reason.as_deref(), Some("submit_no_queue"));
    }

    #[tokio::test]
    async fn test_open_then_discard() {
        let lane = Lane::new(8, Bus::new(8));
        lane.open();
        assert!(lane.is_open());

        let (tx, rx) = oneshot::channel();
        lane.submit(TaskFn::boxed("marker", move |_ctx| async move {
            let _ = tx.send(());
            Ok::<(), TaskError>(())
        }))
        .expect("submit");
        timeout(Duration::from_secs(2), rx).await.expect("ran").expect("signal");

        assert!(lane.discard());
        assert!(!lane.is_open());
        assert!(!lane.discard());
        assert_eq!(lane.submit(noop()), Err(SubmitError::NoQueue));
    }

    #[tokio::test]
    async fn test_reopen_replaces_queue() {
        let lane = Lane::new(8, Bus::new(8));
        lane.open();
        lane.open();
        assert!(lane.is_open());
        assert!(lane.submit(noop()).is_ok());
    }
}
