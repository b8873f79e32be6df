//! # kegcore
//!
//! **kegcore** is the event orchestration core of a kegerator controller.
//!
//! It turns hardware notifications that arrive concurrently (flow-meter
//! readings, authentication tokens, temperature samples) and flow lifecycle
//! notifications into an ordered, single-writer stream of side effects. It
//! also supervises the connections to the hardware and remote-API
//! collaborators and restarts the whole pipeline when the preferences change.
//!
//! ## Architecture
//! ```text
//!   HardwareProvider                       FlowManager
//!   (token / thermo / meter)               (start / update / end)
//!          │                                      │
//!          ▼                                      ▼
//!   HardwareListener                        FlowListener
//!          │ one task per notification            │
//!          └──────────────┬───────────────────────┘
//!                         ▼
//!                  Lane ──► SerialQueue ──► single worker (FIFO, catch_unwind)
//!                                               │
//!                         ┌─────────────────────┼────────────────────┐
//!                         ▼                     ▼                    ▼
//!                  ApiProvider            FlowManager            Presenter
//!        (authenticate, taps, record)  (activate, meter)   (ordered broadcast)
//!
//!   KegbotCore::run()  (controller actor)
//!     ├─ PreferenceStore changes ─► start / stop / restart
//!     ├─ Supervised<api>       ─► Bound: Lane::open() + configure (bootstrap)
//!     └─ Supervised<hardware>  ─► Bound: attach HardwareListener
//! ```
//!
//! ## Features
//! | Area             | Description                                                   | Key types / traits                          |
//! |------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Core**         | Lifecycle, reconfiguration, connection callbacks              | [`KegbotCore`], [`KegbotCoreBuilder`]       |
//! | **Queue**        | Single-worker FIFO lane for every side effect                 | [`SerialQueue`], [`Lane`], [`TaskFn`]       |
//! | **Connections**  | `Unbound → Binding → Bound` per collaborator, epoch-guarded    | [`ServiceBinder`], [`Connection`]           |
//! | **Collaborators**| Contracts the core calls into                                 | [`ApiProvider`], [`HardwareProvider`], [`FlowManager`], [`TapManager`] |
//! | **Events**       | Runtime event stream for hosts and tests                      | [`Event`], [`EventKind`], [`Bus`]           |
//! | **Errors**       | Typed errors with stable labels                               | [`CoreError`], [`TaskError`], [`ApiError`]  |
//!
//! ## Optional features
//! - `logging`: exposes [`logging::init`], a `tracing-subscriber` installer for host binaries.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use kegcore::{
//!     ApiProvider, BindError, Binding, Config, HardwareEventSink, HardwareProvider, KegbotCore,
//!     PreferenceStore, Preferences, ServiceBinder,
//! };
//! # use kegcore::{ApiError, Flow, FlowEventSink, FlowManager, RecordTemperatureRequest, Tap, TapDetailSet, UserDetail};
//! # struct Api;
//! # #[async_trait]
//! # impl ApiProvider for Api {
//! #     fn set_api_url(&self, _url: &url::Url) {}
//! #     fn set_api_key(&self, _key: &str) {}
//! #     async fn authenticate_user(&self, _d: &str, _v: &str) -> Result<UserDetail, ApiError> {
//! #         Err(ApiError::Auth { reason: "offline".into() })
//! #     }
//! #     async fn get_all_taps(&self) -> Result<TapDetailSet, ApiError> {
//! #         Ok(TapDetailSet::default())
//! #     }
//! #     fn record_temperature_async(&self, _r: RecordTemperatureRequest) {}
//! #     fn record_drink_async(&self, _f: Flow) {}
//! # }
//! # struct ApiBinder;
//! # #[async_trait]
//! # impl ServiceBinder<dyn ApiProvider> for ApiBinder {
//! #     async fn connect(&self) -> Result<Binding<dyn ApiProvider>, BindError> {
//! #         let api: Arc<dyn ApiProvider> = Arc::new(Api);
//! #         Ok(Binding::new(api, CancellationToken::new()))
//! #     }
//! #     fn release(&self) {}
//! # }
//! # struct NoFlows;
//! # impl FlowManager for NoFlows {
//! #     fn activate_user_at_tap(&self, _tap: &Tap, _username: &str) {}
//! #     fn handle_meter_activity(&self, _meter: &str, _ticks: u64) {}
//! #     fn add_flow_listener(&self, _l: Arc<dyn FlowEventSink>) {}
//! #     fn remove_flow_listener(&self, _l: &Arc<dyn FlowEventSink>) {}
//! #     fn set_default_idle_time(&self, _idle: Duration) {}
//! #     fn stop(&self) {}
//! # }
//!
//! struct Board;
//!
//! impl HardwareProvider for Board {
//!     fn attach_listener(&self, _listener: Arc<dyn HardwareEventSink>) {}
//!     fn detach_listener(&self, _listener: &Arc<dyn HardwareEventSink>) {}
//! }
//!
//! struct BoardBinder;
//!
//! #[async_trait]
//! impl ServiceBinder<dyn HardwareProvider> for BoardBinder {
//!     async fn connect(&self) -> Result<Binding<dyn HardwareProvider>, BindError> {
//!         let board: Arc<dyn HardwareProvider> = Arc::new(Board);
//!         Ok(Binding::new(board, CancellationToken::new()))
//!     }
//!
//!     fn release(&self) {}
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), kegcore::CoreError> {
//!     let prefs = Arc::new(PreferenceStore::new(Preferences {
//!         run_core: true,
//!         api_key: "secret".into(),
//!         kegbot_url: "http://kegbot.local/api/".parse().ok(),
//!         ..Preferences::default()
//!     }));
//!
//!     let core = KegbotCore::builder(Config::default())
//!         .with_api_binder(Arc::new(ApiBinder))
//!         .with_hardware_binder(Arc::new(BoardBinder))
//!         .with_flow_manager(Arc::new(NoFlows))
//!         .with_preferences(prefs)
//!         .build()?;
//!
//!     let token = CancellationToken::new();
//!     let stop = token.clone();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(50)).await;
//!         stop.cancel();
//!     });
//!     core.run(token).await
//! }
//! ```
mod api;
mod config;
mod connection;
mod core;
mod error;
mod events;
mod flow;
mod hardware;
mod model;
mod prefs;
mod presenter;
mod queue;
mod taps;
mod tasks;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use api::ApiProvider;
pub use config::Config;
pub use connection::{Binding, Connection, ConnectionState, ServiceBinder};
pub use crate::core::{KegbotCore, KegbotCoreBuilder, RunState};
pub use error::{ApiError, BindError, CoreError, SubmitError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use flow::{FlowEventSink, FlowManager};
pub use hardware::{HardwareEventSink, HardwareProvider};
pub use model::{
    AuthenticationToken, Flow, FlowMeter, Keg, KegTap, RecordTemperatureRequest, Tap, TapDetail,
    TapDetailSet, ThermoSensor, UserDetail,
};
pub use prefs::{DEFAULT_IDLE_TIMEOUT, PrefKey, PreferenceStore, Preferences};
pub use presenter::{Broadcast, LogPresenter, Presenter};
pub use queue::{Lane, SerialQueue};
pub use taps::{ConfigurationStore, TapConfigStore, TapManager, TapRegistry};
pub use tasks::{BoxTaskFuture, Task, TaskBox, TaskFn};

// Optional: tracing-subscriber installer for host binaries.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub mod logging;
