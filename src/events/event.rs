//! # Runtime events emitted by the core.
//!
//! The [`EventKind`] enum classifies events across four groups:
//! - **Run state**: core started/stopped, preferences changed
//! - **Connections**: binding, bound, unbound, bind failed (per collaborator)
//! - **Bootstrap**: configured, configure failed
//! - **Queue**: task failed, task panicked, task dropped
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use kegcore::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::Bound).with_service("api");
//! assert_eq!(ev.kind, EventKind::Bound);
//! assert_eq!(ev.service, Some("api"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Run state ===
    /// Core entered `Running`: binds requested, flow listener attached.
    CoreStarted,

    /// Core entered `Stopped`: listeners detached, connections released, queue discarded.
    CoreStopped,

    /// A preference key relevant to the core changed.
    ///
    /// Sets:
    /// - `reason`: preference key name
    PreferencesChanged,

    // === Connections ===
    /// Bind requested; waiting for the connection callback.
    ///
    /// Sets:
    /// - `service`: collaborator name
    Binding,

    /// Connection established; the collaborator handle is live.
    ///
    /// Sets:
    /// - `service`: collaborator name
    Bound,

    /// Connection released by the core or lost.
    ///
    /// Sets:
    /// - `service`: collaborator name
    /// - `reason`: "released" or "lost"
    Unbound,

    /// The bind attempt failed or timed out.
    ///
    /// Sets:
    /// - `service`: collaborator name
    /// - `reason`: failure message
    BindFailed,

    // === Bootstrap ===
    /// Tap list fetched and registered.
    ///
    /// Sets:
    /// - `count`: number of taps registered
    Configured,

    /// Bootstrap failed; the core stays bound but unconfigured.
    ///
    /// Sets:
    /// - `reason`: failure message
    ConfigureFailed,

    // === Queue ===
    /// A queued task returned an error (logged and swallowed).
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: error message
    TaskFailed,

    /// A queued task panicked (caught at the task boundary).
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: panic info
    TaskPanicked,

    /// A submission was not queued (no queue, full or closed).
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: submit error label
    TaskDropped,
}

/// Runtime event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Collaborator name ("api", "hardware"), if applicable.
    pub service: Option<&'static str>,
    /// Name of the queued task, if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (errors, keys, etc.).
    pub reason: Option<Arc<str>>,
    /// Item count (taps configured).
    pub count: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            service: None,
            task: None,
            reason: None,
            count: None,
        }
    }

    /// Attaches a collaborator name.
    #[inline]
    pub fn with_service(mut self, service: &'static str) -> Self {
        self.service = Some(service);
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an item count (saturating at `u32::MAX`).
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }
}
