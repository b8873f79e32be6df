//! Recording fakes for every collaborator, sharing one ordered call journal.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::api::ApiProvider;
use crate::connection::{Binding, ServiceBinder};
use crate::error::{ApiError, BindError, TaskError};
use crate::flow::{FlowEventSink, FlowManager};
use crate::hardware::{HardwareEventSink, HardwareProvider};
use crate::model::{
    Flow, KegTap, RecordTemperatureRequest, Tap, TapDetail, TapDetailSet, UserDetail,
};
use crate::presenter::{Broadcast, Presenter};
use crate::queue::Lane;
use crate::tasks::TaskFn;

/// Ordered log of collaborator calls.
#[derive(Default)]
pub(crate) struct Journal(Mutex<Vec<String>>);

impl Journal {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub(crate) fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|e| *e == entry).count()
    }

    pub(crate) fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.0
            .lock()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }
}

/// Waits until every task submitted to `lane` so far has run.
pub(crate) async fn drain(lane: &Lane) {
    let (tx, rx) = oneshot::channel();
    lane.submit(TaskFn::boxed("drain", move |_ctx| async move {
        let _ = tx.send(());
        Ok::<(), TaskError>(())
    }))
    .expect("lane open");
    timeout(Duration::from_secs(2), rx)
        .await
        .expect("lane drained")
        .expect("marker ran");
}

/// Polls `cond` until it holds or two seconds pass.
pub(crate) async fn eventually(what: &str, cond: impl Fn() -> bool) {
    let waited = timeout(Duration::from_secs(2), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "timed out waiting for: {what}");
}

pub(crate) fn flow(id: u64, meter: &str) -> Flow {
    let now = SystemTime::now();
    Flow {
        id,
        tap_name: format!("tap-{meter}"),
        meter_name: meter.to_owned(),
        ticks: 0,
        volume_ml: 0.0,
        username: None,
        started_at: now,
        updated_at: now,
        ended_at: None,
    }
}

pub(crate) fn tap_detail(description: &str, meter: &str) -> TapDetail {
    TapDetail {
        tap: KegTap {
            id: 0,
            description: description.to_owned(),
            ml_per_tick: 2.2,
            meter_name: meter.to_owned(),
            relay_name: String::new(),
        },
        keg: None,
    }
}

enum Answer<S: ?Sized> {
    Ready(Arc<S>),
    Pending,
    Refuse,
}

/// Binder that connects immediately to a fixed handle, never, or refuses.
pub(crate) struct FakeBinder<S: ?Sized> {
    answer: Answer<S>,
    lost: Mutex<Option<CancellationToken>>,
    starts: AtomicUsize,
    connects: AtomicUsize,
    releases: AtomicUsize,
    stops: AtomicUsize,
}

impl<S: ?Sized> FakeBinder<S> {
    fn with(answer: Answer<S>) -> Self {
        Self {
            answer,
            lost: Mutex::new(None),
            starts: AtomicUsize::new(0),
            connects: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    pub(crate) fn ready(service: Arc<S>) -> Self {
        Self::with(Answer::Ready(service))
    }

    pub(crate) fn pending() -> Self {
        Self::with(Answer::Pending)
    }

    pub(crate) fn refusing() -> Self {
        Self::with(Answer::Refuse)
    }

    /// Simulates the collaborator dropping the latest connection.
    pub(crate) fn drop_connection(&self) {
        if let Some(lost) = self.lost.lock().take() {
            lost.cancel();
        }
    }

    pub(crate) fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub(crate) fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: ?Sized + Send + Sync + 'static> ServiceBinder<S> for FakeBinder<S> {
    async fn connect(&self) -> Result<Binding<S>, BindError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Answer::Ready(service) => {
                let lost = CancellationToken::new();
                *self.lost.lock() = Some(lost.clone());
                Ok(Binding::new(Arc::clone(service), lost))
            }
            Answer::Pending => std::future::pending().await,
            Answer::Refuse => Err(BindError::Refused {
                service: "fake",
                reason: "permission denied".into(),
            }),
        }
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }

    fn start_service(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn stop_service(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) struct FakeApi {
    journal: Arc<Journal>,
    users: Mutex<HashMap<String, String>>,
    taps: Mutex<Result<TapDetailSet, ApiError>>,
    url: Mutex<Option<Url>>,
    key: Mutex<Option<String>>,
    temps: Mutex<Vec<RecordTemperatureRequest>>,
    drinks: Mutex<Vec<Flow>>,
    hold_auth: AtomicBool,
}

impl FakeApi {
    pub(crate) fn new(journal: Arc<Journal>) -> Self {
        Self {
            journal,
            users: Mutex::new(HashMap::new()),
            taps: Mutex::new(Ok(TapDetailSet::default())),
            url: Mutex::new(None),
            key: Mutex::new(None),
            temps: Mutex::new(Vec::new()),
            drinks: Mutex::new(Vec::new()),
            hold_auth: AtomicBool::new(false),
        }
    }

    pub(crate) fn add_user(&self, token_value: &str, username: &str) {
        self.users
            .lock()
            .insert(token_value.to_owned(), username.to_owned());
    }

    pub(crate) fn set_taps(&self, taps: Result<TapDetailSet, ApiError>) {
        *self.taps.lock() = taps;
    }

    /// Makes every later authentication hang forever.
    pub(crate) fn hold_auth(&self) {
        self.hold_auth.store(true, Ordering::SeqCst);
    }

    pub(crate) fn url(&self) -> Option<Url> {
        self.url.lock().clone()
    }

    pub(crate) fn key(&self) -> Option<String> {
        self.key.lock().clone()
    }

    pub(crate) fn temperatures(&self) -> Vec<RecordTemperatureRequest> {
        self.temps.lock().clone()
    }

    pub(crate) fn drinks(&self) -> Vec<Flow> {
        self.drinks.lock().clone()
    }
}

#[async_trait]
impl ApiProvider for FakeApi {
    fn set_api_url(&self, url: &Url) {
        *self.url.lock() = Some(url.clone());
    }

    fn set_api_key(&self, key: &str) {
        *self.key.lock() = Some(key.to_owned());
    }

    async fn authenticate_user(
        &self,
        auth_device: &str,
        token_value: &str,
    ) -> Result<UserDetail, ApiError> {
        self.journal
            .push(format!("authenticate:{auth_device}:{token_value}"));
        if self.hold_auth.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let user = self.users.lock().get(token_value).cloned();
        user.map(UserDetail::new).ok_or_else(|| ApiError::Auth {
            reason: "unknown token".into(),
        })
    }

    async fn get_all_taps(&self) -> Result<TapDetailSet, ApiError> {
        self.journal.push("get_all_taps");
        self.taps.lock().clone()
    }

    fn record_temperature_async(&self, request: RecordTemperatureRequest) {
        self.journal
            .push(format!("record_temperature:{}", request.sensor_name));
        self.temps.lock().push(request);
    }

    fn record_drink_async(&self, flow: Flow) {
        self.journal.push(format!("record_drink:{}", flow.id));
        self.drinks.lock().push(flow);
    }
}

pub(crate) struct FakeHardware {
    journal: Arc<Journal>,
    listener: Mutex<Option<Arc<dyn HardwareEventSink>>>,
}

impl FakeHardware {
    pub(crate) fn new(journal: Arc<Journal>) -> Self {
        Self {
            journal,
            listener: Mutex::new(None),
        }
    }

    pub(crate) fn listener(&self) -> Option<Arc<dyn HardwareEventSink>> {
        self.listener.lock().clone()
    }
}

impl HardwareProvider for FakeHardware {
    fn attach_listener(&self, listener: Arc<dyn HardwareEventSink>) {
        self.journal.push("hw:attach");
        *self.listener.lock() = Some(listener);
    }

    fn detach_listener(&self, listener: &Arc<dyn HardwareEventSink>) {
        self.journal.push("hw:detach");
        let mut current = self.listener.lock();
        if current.as_ref().is_some_and(|l| Arc::ptr_eq(l, listener)) {
            *current = None;
        }
    }
}

pub(crate) struct FakeFlowManager {
    journal: Arc<Journal>,
    listeners: Mutex<Vec<Arc<dyn FlowEventSink>>>,
    idle: Mutex<Option<Duration>>,
    stops: AtomicUsize,
    active: Mutex<Vec<Flow>>,
}

impl FakeFlowManager {
    pub(crate) fn new(journal: Arc<Journal>) -> Self {
        Self {
            journal,
            listeners: Mutex::new(Vec::new()),
            idle: Mutex::new(None),
            stops: AtomicUsize::new(0),
            active: Mutex::new(Vec::new()),
        }
    }

    /// Registers a pour that `stop()` ends through the flow listeners.
    pub(crate) fn begin_pour(&self, flow: Flow) {
        self.active.lock().push(flow);
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub(crate) fn idle(&self) -> Option<Duration> {
        *self.idle.lock()
    }

    pub(crate) fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl FlowManager for FakeFlowManager {
    fn activate_user_at_tap(&self, tap: &Tap, username: &str) {
        self.journal
            .push(format!("activate:{}:{username}", tap.name()));
    }

    fn handle_meter_activity(&self, meter_name: &str, ticks: u64) {
        self.journal.push(format!("meter:{meter_name}:{ticks}"));
    }

    fn add_flow_listener(&self, listener: Arc<dyn FlowEventSink>) {
        self.listeners.lock().push(listener);
    }

    fn remove_flow_listener(&self, listener: &Arc<dyn FlowEventSink>) {
        self.listeners.lock().retain(|l| !Arc::ptr_eq(l, listener));
    }

    fn set_default_idle_time(&self, idle: Duration) {
        *self.idle.lock() = Some(idle);
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        let ended: Vec<Flow> = self.active.lock().drain(..).collect();
        let listeners = self.listeners.lock().clone();
        for mut flow in ended {
            flow.ended_at = Some(SystemTime::now());
            for listener in &listeners {
                listener.on_flow_end(flow.clone());
            }
        }
    }
}

pub(crate) struct FakePresenter {
    journal: Arc<Journal>,
    notices: Mutex<Vec<String>>,
    foreground: AtomicBool,
}

impl FakePresenter {
    pub(crate) fn new(journal: Arc<Journal>) -> Self {
        Self {
            journal,
            notices: Mutex::new(Vec::new()),
            foreground: AtomicBool::new(false),
        }
    }

    pub(crate) fn notices(&self) -> Vec<String> {
        self.notices.lock().clone()
    }

    pub(crate) fn in_foreground(&self) -> bool {
        self.foreground.load(Ordering::SeqCst)
    }
}

impl Presenter for FakePresenter {
    fn send_ordered_broadcast(&self, msg: Broadcast) {
        let entry = match &msg {
            Broadcast::PourStart(f) => format!("broadcast:start:{}", f.id),
            Broadcast::PourUpdate(f) => format!("broadcast:update:{}", f.id),
        };
        self.journal.push(entry);
    }

    fn notice(&self, text: &str) {
        self.notices.lock().push(text.to_owned());
    }

    fn enter_foreground(&self) {
        self.foreground.store(true, Ordering::SeqCst);
    }

    fn exit_foreground(&self) {
        self.foreground.store(false, Ordering::SeqCst);
    }
}
