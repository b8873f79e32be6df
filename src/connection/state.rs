use std::sync::Arc;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Connection state of one collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unbound,
    Binding,
    Bound,
}

struct Slot<S: ?Sized> {
    state: ConnectionState,
    service: Option<Arc<S>>,
    epoch: u64,
    /// Cancelled on release; stops the pending connect and the loss watcher.
    guard: Option<CancellationToken>,
}

/// State cell for one collaborator connection.
///
/// Mutated only by the core controller; read by queued tasks through
/// [`Connection::require`].
pub struct Connection<S: ?Sized> {
    name: &'static str,
    slot: RwLock<Slot<S>>,
}

impl<S: ?Sized> Connection<S> {
    /// Creates an `Unbound` connection.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: RwLock::new(Slot {
                state: ConnectionState::Unbound,
                service: None,
                epoch: 0,
                guard: None,
            }),
        }
    }

    /// Collaborator name used in logs and events.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> ConnectionState {
        self.slot.read().state
    }

    /// Returns the live handle; `None` unless `Bound`.
    pub fn service(&self) -> Option<Arc<S>> {
        let slot = self.slot.read();
        match slot.state {
            ConnectionState::Bound => slot.service.clone(),
            ConnectionState::Unbound | ConnectionState::Binding => None,
        }
    }

    /// Returns the live handle or `TaskError::Unbound`.
    pub fn require(&self) -> Result<Arc<S>, TaskError> {
        self.service()
            .ok_or(TaskError::Unbound { service: self.name })
    }

    /// `Unbound → Binding`. Returns the new epoch and its guard token, or
    /// `None` if a connection is already pending or live.
    pub(crate) fn begin(&self) -> Option<(u64, CancellationToken)> {
        let mut slot = self.slot.write();
        if slot.state != ConnectionState::Unbound {
            return None;
        }
        let guard = CancellationToken::new();
        slot.epoch += 1;
        slot.state = ConnectionState::Binding;
        slot.guard = Some(guard.clone());
        Some((slot.epoch, guard))
    }

    /// `Binding → Bound` for the current epoch.
    pub(crate) fn complete(&self, epoch: u64, service: Arc<S>) -> bool {
        let mut slot = self.slot.write();
        if slot.epoch != epoch || slot.state != ConnectionState::Binding {
            return false;
        }
        slot.state = ConnectionState::Bound;
        slot.service = Some(service);
        true
    }

    /// `Binding | Bound → Unbound` for the current epoch (bind failure or loss).
    pub(crate) fn drop_epoch(&self, epoch: u64) -> bool {
        let mut slot = self.slot.write();
        if slot.epoch != epoch || slot.state == ConnectionState::Unbound {
            return false;
        }
        Self::reset(&mut slot);
        true
    }

    /// `Binding | Bound → Unbound` regardless of epoch. Returns `false` if already `Unbound`.
    pub(crate) fn release(&self) -> bool {
        let mut slot = self.slot.write();
        if slot.state == ConnectionState::Unbound {
            return false;
        }
        Self::reset(&mut slot);
        true
    }

    fn reset(slot: &mut Slot<S>) {
        slot.state = ConnectionState::Unbound;
        slot.service = None;
        if let Some(guard) = slot.guard.take() {
            guard.cancel();
        }
    }
}
