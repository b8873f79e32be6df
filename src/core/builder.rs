use std::sync::Arc;

use crate::api::ApiProvider;
use crate::config::Config;
use crate::connection::{ServiceBinder, Supervised};
use crate::error::CoreError;
use crate::events::Bus;
use crate::flow::{FlowEventSink, FlowListener, FlowManager};
use crate::hardware::{HardwareEventSink, HardwareListener, HardwareProvider};
use crate::prefs::PreferenceStore;
use crate::presenter::{LogPresenter, Presenter};
use crate::queue::Lane;
use crate::taps::{ConfigurationStore, TapConfigStore, TapManager, TapRegistry};

use super::service::{CoreParts, KegbotCore};

/// Builder for [`KegbotCore`].
///
/// Mandatory: API binder, hardware binder, flow manager, preference store.
/// Tap manager, configuration store and presenter fall back to the in-memory
/// and logging implementations.
pub struct KegbotCoreBuilder {
    cfg: Config,
    api_binder: Option<Arc<dyn ServiceBinder<dyn ApiProvider>>>,
    hardware_binder: Option<Arc<dyn ServiceBinder<dyn HardwareProvider>>>,
    flow_manager: Option<Arc<dyn FlowManager>>,
    tap_manager: Option<Arc<dyn TapManager>>,
    config_store: Option<Arc<dyn ConfigurationStore>>,
    preferences: Option<Arc<PreferenceStore>>,
    presenter: Option<Arc<dyn Presenter>>,
}

impl KegbotCoreBuilder {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            api_binder: None,
            hardware_binder: None,
            flow_manager: None,
            tap_manager: None,
            config_store: None,
            preferences: None,
            presenter: None,
        }
    }

    pub fn with_api_binder(mut self, binder: Arc<dyn ServiceBinder<dyn ApiProvider>>) -> Self {
        self.api_binder = Some(binder);
        self
    }

    /// The binder is also asked to start and stop the hardware's backing process.
    pub fn with_hardware_binder(
        mut self,
        binder: Arc<dyn ServiceBinder<dyn HardwareProvider>>,
    ) -> Self {
        self.hardware_binder = Some(binder);
        self
    }

    pub fn with_flow_manager(mut self, flow_manager: Arc<dyn FlowManager>) -> Self {
        self.flow_manager = Some(flow_manager);
        self
    }

    pub fn with_tap_manager(mut self, tap_manager: Arc<dyn TapManager>) -> Self {
        self.tap_manager = Some(tap_manager);
        self
    }

    pub fn with_config_store(mut self, store: Arc<dyn ConfigurationStore>) -> Self {
        self.config_store = Some(store);
        self
    }

    pub fn with_preferences(mut self, prefs: Arc<PreferenceStore>) -> Self {
        self.preferences = Some(prefs);
        self
    }

    pub fn with_presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Wires the queue lane, both supervised connections and both listeners.
    ///
    /// Nothing is bound until [`KegbotCore::run`] is called.
    pub fn build(self) -> Result<Arc<KegbotCore>, CoreError> {
        let api_binder = required(self.api_binder, "api_binder")?;
        let hardware_binder = required(self.hardware_binder, "hardware_binder")?;
        let flow_manager = required(self.flow_manager, "flow_manager")?;
        let prefs = required(self.preferences, "preferences")?;
        let tap_manager: Arc<dyn TapManager> = self
            .tap_manager
            .unwrap_or_else(|| Arc::new(TapRegistry::new()));
        let config_store: Arc<dyn ConfigurationStore> = self
            .config_store
            .unwrap_or_else(|| Arc::new(TapConfigStore::new()));
        let presenter: Arc<dyn Presenter> = self
            .presenter
            .unwrap_or_else(|| Arc::new(LogPresenter::new()));

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let lane = Arc::new(Lane::new(self.cfg.queue_capacity_clamped(), bus.clone()));
        let bind_timeout = self.cfg.bind_timeout();

        let (api, api_rx) = Supervised::new("api", api_binder, bind_timeout, false, bus.clone());
        let (hardware, hardware_rx) =
            Supervised::new("hardware", hardware_binder, bind_timeout, true, bus.clone());

        let hardware_sink: Arc<dyn HardwareEventSink> = Arc::new(HardwareListener::new(
            Arc::clone(&lane),
            Arc::clone(api.connection()),
            Arc::clone(&flow_manager),
            Arc::clone(&tap_manager),
        ));
        let flow_listener = Arc::new(FlowListener::new(
            Arc::clone(&lane),
            Arc::clone(api.connection()),
            Arc::clone(&presenter),
        ));
        let flow_sink: Arc<dyn FlowEventSink> = flow_listener.clone();

        Ok(Arc::new(KegbotCore::from_parts(CoreParts {
            bus,
            lane,
            api,
            api_rx,
            hardware,
            hardware_rx,
            flow_manager,
            tap_manager,
            config_store,
            prefs,
            presenter,
            hardware_sink,
            flow_listener,
            flow_sink,
        })))
    }
}

fn required<T>(slot: Option<T>, name: &'static str) -> Result<T, CoreError> {
    slot.ok_or(CoreError::MissingCollaborator { name })
}
