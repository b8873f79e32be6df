//! # KegbotCore: the controller actor.
//!
//! One task (`run`) owns every lifecycle transition of the core. Connection
//! callbacks and preference changes arrive as messages and are applied in
//! arrival order, so no two transitions ever interleave.
//!
//! ```text
//!  ServiceBinder(api) ── Lifecycle ──┐
//!  ServiceBinder(hw)  ── Lifecycle ──┼──► run() select loop ──► start() / stop()
//!  PreferenceStore    ── PrefKey   ──┤                          on_api() / on_hardware()
//!  CancellationToken  ───────────────┘
//!
//!  start():  bind api, bind hardware, add flow listener, enter foreground
//!  api Bound:       notice, Lane::open(), submit configure
//!  hardware Bound:  attach hardware listener
//!  stop():   FlowManager::stop (drinks it ends are recorded directly), remove flow
//!            listener, unbind api, detach hardware listener, unbind hardware,
//!            discard lane, exit foreground
//! ```
//!
//! ## Rules
//! - While `Stopped` no listener is attached and no connection is held.
//! - While `Running` each collaborator is bound at most once.
//! - A restart-triggering preference change while `Running` is a full stop then start.
//! - Preferences are compared against the last applied snapshot, so a lagged
//!   change stream restarts only if a restart key actually differs.
//! - Leaving `run`, including dropping its future, always performs the stop sequence.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::bootstrap::Bootstrap;
use super::builder::KegbotCoreBuilder;
use super::shutdown;
use crate::api::ApiProvider;
use crate::config::Config;
use crate::connection::{ConnectionState, Lifecycle, Supervised, Transition};
use crate::error::CoreError;
use crate::events::{Bus, Event, EventKind};
use crate::flow::{FlowEventSink, FlowListener, FlowManager};
use crate::hardware::{HardwareEventSink, HardwareProvider};
use crate::prefs::{PrefKey, PreferenceStore, Preferences};
use crate::presenter::Presenter;
use crate::queue::Lane;
use crate::taps::{ConfigurationStore, TapManager};

/// Whether the pipeline is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

struct Inbox {
    api: UnboundedReceiver<Lifecycle<dyn ApiProvider>>,
    hardware: UnboundedReceiver<Lifecycle<dyn HardwareProvider>>,
}

pub(super) struct CoreParts {
    pub(super) bus: Bus,
    pub(super) lane: Arc<Lane>,
    pub(super) api: Supervised<dyn ApiProvider>,
    pub(super) api_rx: UnboundedReceiver<Lifecycle<dyn ApiProvider>>,
    pub(super) hardware: Supervised<dyn HardwareProvider>,
    pub(super) hardware_rx: UnboundedReceiver<Lifecycle<dyn HardwareProvider>>,
    pub(super) flow_manager: Arc<dyn FlowManager>,
    pub(super) tap_manager: Arc<dyn TapManager>,
    pub(super) config_store: Arc<dyn ConfigurationStore>,
    pub(super) prefs: Arc<PreferenceStore>,
    pub(super) presenter: Arc<dyn Presenter>,
    pub(super) hardware_sink: Arc<dyn HardwareEventSink>,
    pub(super) flow_listener: Arc<FlowListener>,
    pub(super) flow_sink: Arc<dyn FlowEventSink>,
}

/// Event orchestration core of a kegerator controller.
pub struct KegbotCore {
    bus: Bus,
    lane: Arc<Lane>,
    api: Supervised<dyn ApiProvider>,
    hardware: Supervised<dyn HardwareProvider>,
    flow_manager: Arc<dyn FlowManager>,
    tap_manager: Arc<dyn TapManager>,
    config_store: Arc<dyn ConfigurationStore>,
    prefs: Arc<PreferenceStore>,
    presenter: Arc<dyn Presenter>,
    hardware_sink: Arc<dyn HardwareEventSink>,
    flow_listener: Arc<FlowListener>,
    // Same listener as `flow_listener`, as registered with the flow manager.
    flow_sink: Arc<dyn FlowEventSink>,

    run_state: RwLock<RunState>,
    // Preferences the current run state was derived from.
    applied: Mutex<Preferences>,
    // Hardware handle the listener is currently attached to.
    attached: Mutex<Option<Arc<dyn HardwareProvider>>>,
    // Taken by `run`, put back when it returns.
    inbox: Mutex<Option<Inbox>>,
}

impl KegbotCore {
    pub fn builder(cfg: Config) -> KegbotCoreBuilder {
        KegbotCoreBuilder::new(cfg)
    }

    pub(super) fn from_parts(p: CoreParts) -> Self {
        Self {
            bus: p.bus,
            lane: p.lane,
            api: p.api,
            hardware: p.hardware,
            flow_manager: p.flow_manager,
            tap_manager: p.tap_manager,
            config_store: p.config_store,
            prefs: p.prefs,
            presenter: p.presenter,
            hardware_sink: p.hardware_sink,
            flow_listener: p.flow_listener,
            flow_sink: p.flow_sink,
            run_state: RwLock::new(RunState::Stopped),
            applied: Mutex::new(Preferences::default()),
            attached: Mutex::new(None),
            inbox: Mutex::new(Some(Inbox {
                api: p.api_rx,
                hardware: p.hardware_rx,
            })),
        }
    }

    /// Drives the core until `token` is cancelled, then stops it.
    ///
    /// Applies the current preferences on entry. Returns
    /// [`CoreError::AlreadyRunning`] if another `run` is active. Dropping the
    /// returned future also stops the core and allows a later `run`.
    pub async fn run(&self, token: CancellationToken) -> Result<(), CoreError> {
        let inbox = self.inbox.lock().take().ok_or(CoreError::AlreadyRunning)?;
        let mut guard = RunGuard {
            core: self,
            inbox: Some(inbox),
        };
        if let Some(inbox) = guard.inbox.as_mut() {
            self.drive(inbox, token).await;
        }
        Ok(())
    }

    async fn drive(&self, inbox: &mut Inbox, token: CancellationToken) {
        let mut changes = self.prefs.subscribe();
        let mut prefs_open = true;

        *self.applied.lock() = self.prefs.snapshot();
        self.apply_idle_timeout();
        self.update_from_preferences(false);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                Some(msg) = inbox.api.recv() => self.on_api(msg),
                Some(msg) = inbox.hardware.recv() => self.on_hardware(msg),
                change = changes.recv(), if prefs_open => match change {
                    Ok(key) => self.on_preference(key),
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "preference notifications lagged; reconciling snapshot");
                        self.reconcile();
                    }
                    Err(RecvError::Closed) => {
                        debug!("preference store closed");
                        prefs_open = false;
                    }
                },
            }
        }
    }

    /// Like [`KegbotCore::run`], until SIGINT/SIGTERM/SIGQUIT (Ctrl-C elsewhere).
    pub async fn run_until_signal(&self) -> Result<(), CoreError> {
        let token = CancellationToken::new();
        let run = self.run(token.clone());
        tokio::pin!(run);

        tokio::select! {
            res = &mut run => res,
            sig = shutdown::wait_for_shutdown_signal() => {
                match &sig {
                    Ok(()) => info!("shutdown signal received"),
                    Err(e) => error!(error = %e, "signal handler registration failed"),
                }
                token.cancel();
                run.await?;
                sig.map_err(CoreError::from)
            }
        }
    }

    pub fn flow_manager(&self) -> &Arc<dyn FlowManager> {
        &self.flow_manager
    }

    pub fn tap_manager(&self) -> &Arc<dyn TapManager> {
        &self.tap_manager
    }

    pub fn preferences(&self) -> &Arc<PreferenceStore> {
        &self.prefs
    }

    pub fn run_state(&self) -> RunState {
        *self.run_state.read()
    }

    pub fn api_state(&self) -> ConnectionState {
        self.api.connection().state()
    }

    pub fn hardware_state(&self) -> ConnectionState {
        self.hardware.connection().state()
    }

    /// Runtime event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// The sink attached to the hardware provider while running.
    pub fn hardware_sink(&self) -> &Arc<dyn HardwareEventSink> {
        &self.hardware_sink
    }

    /// The sink registered with the flow manager while running.
    pub fn flow_sink(&self) -> &Arc<dyn FlowEventSink> {
        &self.flow_sink
    }

    fn on_preference(&self, key: PrefKey) {
        debug!(key = key.as_str(), "preference changed");
        self.bus
            .publish(Event::new(EventKind::PreferencesChanged).with_reason(key.as_str()));
        self.reconcile();
    }

    /// Applies whatever differs between the current and the last applied preferences.
    fn reconcile(&self) {
        let current = self.prefs.snapshot();
        let previous = std::mem::replace(&mut *self.applied.lock(), current.clone());
        let changed = previous.diff(&current);
        if changed.is_empty() {
            return;
        }
        debug!(?changed, "reconciling preferences");
        if changed.contains(&PrefKey::IdleTimeout) {
            self.apply_idle_timeout();
        }
        if changed.iter().any(|k| k.triggers_restart()) {
            self.update_from_preferences(true);
        }
    }

    fn apply_idle_timeout(&self) {
        let idle = self.applied.lock().idle_timeout;
        debug!(?idle, "applying idle timeout");
        self.flow_manager.set_default_idle_time(idle);
    }

    fn update_from_preferences(&self, restart: bool) {
        let run_core = self.applied.lock().run_core;
        if run_core {
            if restart && self.run_state() == RunState::Running {
                info!("reconfiguring core");
                self.stop();
            }
            self.start();
        } else {
            self.stop();
        }
    }

    fn start(&self) {
        {
            let mut state = self.run_state.write();
            if *state == RunState::Running {
                return;
            }
            *state = RunState::Running;
        }
        info!("starting core");
        self.api.bind();
        self.hardware.bind();
        self.flow_manager
            .add_flow_listener(Arc::clone(&self.flow_sink));
        self.presenter.enter_foreground();
        self.bus.publish(Event::new(EventKind::CoreStarted));
    }

    fn stop(&self) {
        {
            let mut state = self.run_state.write();
            if *state == RunState::Stopped {
                return;
            }
            *state = RunState::Stopped;
        }
        info!("stopping core");
        self.flow_listener.set_draining(true);
        self.flow_manager.stop();
        self.flow_manager.remove_flow_listener(&self.flow_sink);
        self.flow_listener.set_draining(false);
        self.api.unbind();
        if let Some(hardware) = self.attached.lock().take() {
            hardware.detach_listener(&self.hardware_sink);
        }
        self.hardware.unbind();
        if self.lane.discard() {
            debug!("serialized queue discarded");
        }
        self.presenter.exit_foreground();
        self.bus.publish(Event::new(EventKind::CoreStopped));
    }

    fn on_api(&self, msg: Lifecycle<dyn ApiProvider>) {
        match self.api.apply(msg) {
            Transition::Bound(api) => {
                self.presenter.notice("api connection established");
                self.lane.open();
                let bootstrap = Bootstrap {
                    api,
                    prefs: Arc::clone(&self.prefs),
                    tap_manager: Arc::clone(&self.tap_manager),
                    config_store: Arc::clone(&self.config_store),
                    bus: self.bus.clone(),
                };
                let _ = self.lane.submit(bootstrap.into_task());
            }
            Transition::Lost => self.presenter.notice("api connection lost"),
            Transition::Failed | Transition::Stale => {}
        }
    }

    fn on_hardware(&self, msg: Lifecycle<dyn HardwareProvider>) {
        match self.hardware.apply(msg) {
            Transition::Bound(hardware) => {
                self.presenter.notice("hardware connection established");
                hardware.attach_listener(Arc::clone(&self.hardware_sink));
                *self.attached.lock() = Some(hardware);
            }
            Transition::Lost => {
                self.attached.lock().take();
                self.presenter.notice("hardware connection lost");
            }
            Transition::Failed | Transition::Stale => {}
        }
    }
}

// Stops the core and returns the inbox when `run` returns or its future is dropped.
struct RunGuard<'a> {
    core: &'a KegbotCore,
    inbox: Option<Inbox>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.core.stop();
        if let Some(inbox) = self.inbox.take() {
            *self.core.inbox.lock() = Some(inbox);
        }
    }
}
