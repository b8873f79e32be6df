//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from multiple sources.
//!
//! ```text
//! Publishers (many):                    Receivers (any):
//!   controller ──┐
//!   queue      ──┼──────► Bus ───────► KegbotCore::subscribe()
//!   lane       ──┤  (broadcast chan)
//!   bootstrap  ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone; every clone publishes into the same ring buffer.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_receiver_sees_only_later_events() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::CoreStarted));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::CoreStopped));

        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::CoreStopped);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_without_receivers_is_silent() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::Configured).with_count(2));
    }
}
