//! # Supervised: bind/unbind driver for one collaborator.
//!
//! ```text
//! bind() ── Connection::begin() ──► spawn ──► [start_service] binder.connect()
//!                                               ├─ Ok(binding) ─► Lifecycle::Connected ─┐
//!                                               │                   await lost ─► Lost  ├─► core controller
//!                                               └─ Err / timeout ─► Lifecycle::Failed ──┘      │
//!                                                                                            apply()
//! unbind() ── Connection::release() ── binder.release() [── stop_service]
//! ```
//!
//! `unbind()` releases the binder whenever a `bind()` preceded it, including
//! after the connection was lost or failed; the backing process started by
//! `bind()` is always stopped by the matching `unbind()`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, info, warn};

use super::{Connection, ServiceBinder};
use crate::error::BindError;
use crate::events::{Bus, Event, EventKind};

/// Connection callback delivered to the core controller.
pub enum Lifecycle<S: ?Sized> {
    Connected { epoch: u64, service: Arc<S> },
    Failed { epoch: u64, error: BindError },
    Lost { epoch: u64 },
}

/// Result of applying a [`Lifecycle`] message.
pub enum Transition<S: ?Sized> {
    /// `Binding → Bound`; carries the fresh handle.
    Bound(Arc<S>),
    /// `Bound → Unbound` on loss.
    Lost,
    /// `Binding → Unbound` on failure.
    Failed,
    /// Message from an earlier epoch, ignored.
    Stale,
}

/// Supervised connection to one collaborator.
pub struct Supervised<S: ?Sized + Send + Sync + 'static> {
    conn: Arc<Connection<S>>,
    binder: Arc<dyn ServiceBinder<S>>,
    bind_timeout: Option<Duration>,
    manage_process: bool,
    bus: Bus,
    tx: mpsc::UnboundedSender<Lifecycle<S>>,
    // Set by `bind()`, cleared by `unbind()`; outlives loss and failure.
    requested: AtomicBool,
}

impl<S: ?Sized + Send + Sync + 'static> Supervised<S> {
    /// Creates an `Unbound` supervised connection and the receiver for its callbacks.
    ///
    /// With `manage_process`, binding starts the collaborator's backing process
    /// and unbinding stops it.
    pub fn new(
        name: &'static str,
        binder: Arc<dyn ServiceBinder<S>>,
        bind_timeout: Option<Duration>,
        manage_process: bool,
        bus: Bus,
    ) -> (Self, mpsc::UnboundedReceiver<Lifecycle<S>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sup = Self {
            conn: Arc::new(Connection::new(name)),
            binder,
            bind_timeout,
            manage_process,
            bus,
            tx,
            requested: AtomicBool::new(false),
        };
        (sup, rx)
    }

    /// Shared state cell, handed to listeners and tasks.
    pub fn connection(&self) -> &Arc<Connection<S>> {
        &self.conn
    }

    /// Requests a connection. Returns `false` if already `Binding` or `Bound`.
    pub fn bind(&self) -> bool {
        let Some((epoch, guard)) = self.conn.begin() else {
            debug!(service = self.conn.name(), "bind ignored: already binding or bound");
            return false;
        };
        let name = self.conn.name();
        self.requested.store(true, Ordering::SeqCst);
        self.bus
            .publish(Event::new(EventKind::Binding).with_service(name));

        if self.manage_process {
            self.binder.start_service();
        }

        let binder = Arc::clone(&self.binder);
        let tx = self.tx.clone();
        let bind_timeout = self.bind_timeout;

        tokio::spawn(async move {
            let connect = async {
                match bind_timeout {
                    Some(limit) => time::timeout(limit, binder.connect())
                        .await
                        .unwrap_or_else(|_| {
                            Err(BindError::Timeout {
                                service: name,
                                timeout: limit,
                            })
                        }),
                    None => binder.connect().await,
                }
            };
            let res = tokio::select! {
                _ = guard.cancelled() => return,
                res = connect => res,
            };

            match res {
                Ok(binding) => {
                    let (service, lost) = binding.into_parts();
                    if tx.send(Lifecycle::Connected { epoch, service }).is_err() {
                        return;
                    }
                    tokio::select! {
                        _ = guard.cancelled() => {}
                        _ = lost.cancelled() => {
                            let _ = tx.send(Lifecycle::Lost { epoch });
                        }
                    }
                }
                Err(error) => {
                    let _ = tx.send(Lifecycle::Failed { epoch, error });
                }
            }
        });
        true
    }

    /// Releases the connection requested by the last `bind()`.
    ///
    /// Returns `false` if nothing was requested since the previous `unbind()`.
    pub fn unbind(&self) -> bool {
        let held = self.conn.release();
        let requested = self.requested.swap(false, Ordering::SeqCst);
        if !held && !requested {
            return false;
        }
        self.binder.release();
        if self.manage_process {
            self.binder.stop_service();
        }
        let name = self.conn.name();
        debug!(service = name, "unbound");
        self.bus.publish(
            Event::new(EventKind::Unbound)
                .with_service(name)
                .with_reason("released"),
        );
        true
    }

    /// Applies a connection callback to the state machine.
    pub fn apply(&self, msg: Lifecycle<S>) -> Transition<S> {
        let name = self.conn.name();
        match msg {
            Lifecycle::Connected { epoch, service } => {
                if !self.conn.complete(epoch, Arc::clone(&service)) {
                    debug!(service = name, epoch, "stale connect ignored");
                    return Transition::Stale;
                }
                info!(service = name, "connection established");
                self.bus
                    .publish(Event::new(EventKind::Bound).with_service(name));
                Transition::Bound(service)
            }
            Lifecycle::Lost { epoch } => {
                if !self.conn.drop_epoch(epoch) {
                    return Transition::Stale;
                }
                warn!(service = name, "connection lost");
                self.bus.publish(
                    Event::new(EventKind::Unbound)
                        .with_service(name)
                        .with_reason("lost"),
                );
                Transition::Lost
            }
            Lifecycle::Failed { epoch, error } => {
                if !self.conn.drop_epoch(epoch) {
                    return Transition::Stale;
                }
                warn!(service = name, label = error.as_label(), error = %error, "bind failed");
                self.binder.release();
                self.bus.publish(
                    Event::new(EventKind::BindFailed)
                        .with_service(name)
                        .with_reason(error.to_string()),
                );
                Transition::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionState;
    use crate::testing::FakeBinder;
    use tokio::time::timeout;

    struct Gadget;

    fn supervised(
        binder: Arc<FakeBinder<Gadget>>,
        bind_timeout: Option<Duration>,
    ) -> (Supervised<Gadget>, mpsc::UnboundedReceiver<Lifecycle<Gadget>>) {
        Supervised::new("gadget", binder, bind_timeout, true, Bus::new(16))
    }

    async fn next<S: ?Sized>(rx: &mut mpsc::UnboundedReceiver<Lifecycle<S>>) -> Lifecycle<S> {
        timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("lifecycle message")
            .expect("channel open")
    }

    #[tokio::test]
    async fn test_bind_connect_and_unbind() {
        let binder = Arc::new(FakeBinder::ready(Arc::new(Gadget)));
        let (sup, mut rx) = supervised(Arc::clone(&binder), None);

        assert!(sup.bind());
        assert!(!sup.bind(), "second bind is a no-op");
        assert_eq!(binder.starts(), 1);

        let msg = next(&mut rx).await;
        assert!(matches!(sup.apply(msg), Transition::Bound(_)));
        assert_eq!(sup.connection().state(), ConnectionState::Bound);
        assert_eq!(binder.connects(), 1);

        assert!(sup.unbind());
        assert!(!sup.unbind(), "second unbind is a no-op");
        assert_eq!(binder.releases(), 1);
        assert_eq!(binder.stops(), 1);
        assert_eq!(sup.connection().state(), ConnectionState::Unbound);
    }

    #[tokio::test]
    async fn test_loss_returns_to_unbound() {
        let binder = Arc::new(FakeBinder::ready(Arc::new(Gadget)));
        let (sup, mut rx) = supervised(Arc::clone(&binder), None);
        sup.bind();
        let msg = next(&mut rx).await;
        sup.apply(msg);

        binder.drop_connection();
        let msg = next(&mut rx).await;
        assert!(matches!(sup.apply(msg), Transition::Lost));
        assert_eq!(sup.connection().state(), ConnectionState::Unbound);
        assert!(sup.connection().service().is_none());
    }

    #[tokio::test]
    async fn test_unbind_after_loss_still_releases_and_stops() {
        let binder = Arc::new(FakeBinder::ready(Arc::new(Gadget)));
        let (sup, mut rx) = supervised(Arc::clone(&binder), None);
        sup.bind();
        let msg = next(&mut rx).await;
        sup.apply(msg);
        binder.drop_connection();
        let msg = next(&mut rx).await;
        assert!(matches!(sup.apply(msg), Transition::Lost));

        assert!(sup.unbind());
        assert_eq!(binder.releases(), 1);
        assert_eq!(binder.stops(), 1);
        assert!(!sup.unbind());
        assert_eq!(binder.stops(), 1);
    }

    #[tokio::test]
    async fn test_bind_timeout_reports_failure() {
        let binder = Arc::new(FakeBinder::<Gadget>::pending());
        let (sup, mut rx) = supervised(binder, Some(Duration::from_millis(20)));
        sup.bind();

        let msg = next(&mut rx).await;
        match &msg {
            Lifecycle::Failed { error, .. } => {
                assert!(matches!(error, BindError::Timeout { service: "gadget", .. }))
            }
            _ => panic!("expected failure"),
        }
        assert!(matches!(sup.apply(msg), Transition::Failed));
        assert_eq!(sup.connection().state(), ConnectionState::Unbound);
    }

    #[tokio::test]
    async fn test_unbind_while_binding_discards_late_connect() {
        let binder = Arc::new(FakeBinder::ready(Arc::new(Gadget)));
        let (sup, mut rx) = supervised(binder, None);
        sup.bind();
        let late = next(&mut rx).await;

        sup.unbind();
        sup.bind();
        assert!(matches!(sup.apply(late), Transition::Stale));
        assert_eq!(sup.connection().state(), ConnectionState::Binding);

        let fresh = next(&mut rx).await;
        assert!(matches!(sup.apply(fresh), Transition::Bound(_)));
    }
}
