//! # HardwareListener: hardware notifications → queued tasks.
//!
//! ```text
//! on_token_attached ──► task "token-attached":  authenticate ─► activate user at every tap
//! on_thermo_update  ──► task "thermo-update":   record temperature (fire-and-forget)
//! on_meter_update   ──► task "meter-update":    handle meter activity (whole ticks)
//! on_token_removed / on_token_swiped ──► log only
//! ```
//!
//! ## Rules
//! - Exactly one submission per notification; the callback thread never waits.
//! - Authentication failure means "anonymous": no activation, no error.
//! - Activation is broadcast to **all** registered taps, in registry order,
//!   not only the tap the token was read at.

use std::sync::Arc;

use tracing::{debug, warn};

use super::HardwareEventSink;
use crate::api::ApiProvider;
use crate::connection::Connection;
use crate::error::TaskError;
use crate::flow::FlowManager;
use crate::model::{AuthenticationToken, FlowMeter, RecordTemperatureRequest, ThermoSensor};
use crate::queue::Lane;
use crate::taps::TapManager;
use crate::tasks::TaskFn;

/// The core's [`HardwareEventSink`].
pub struct HardwareListener {
    lane: Arc<Lane>,
    api: Arc<Connection<dyn ApiProvider>>,
    flow_manager: Arc<dyn FlowManager>,
    tap_manager: Arc<dyn TapManager>,
}

impl HardwareListener {
    pub fn new(
        lane: Arc<Lane>,
        api: Arc<Connection<dyn ApiProvider>>,
        flow_manager: Arc<dyn FlowManager>,
        tap_manager: Arc<dyn TapManager>,
    ) -> Self {
        Self {
            lane,
            api,
            flow_manager,
            tap_manager,
        }
    }
}

impl HardwareEventSink for HardwareListener {
    fn on_token_attached(&self, token: AuthenticationToken, tap_name: &str) {
        debug!(?token, tap = tap_name, "token attached");
        let api = Arc::clone(&self.api);
        let flow_manager = Arc::clone(&self.flow_manager);
        let tap_manager = Arc::clone(&self.tap_manager);
        let _ = self.lane.submit(TaskFn::boxed("token-attached", move |_ctx| {
            activate_token_user(api, flow_manager, tap_manager, token)
        }));
    }

    fn on_token_removed(&self, token: AuthenticationToken, tap_name: &str) {
        debug!(?token, tap = tap_name, "token removed");
    }

    fn on_token_swiped(&self, token: AuthenticationToken, tap_name: &str) {
        debug!(?token, tap = tap_name, "token swiped");
    }

    fn on_thermo_sensor_update(&self, sensor: ThermoSensor) {
        let api = Arc::clone(&self.api);
        let _ = self.lane.submit(TaskFn::boxed("thermo-update", move |_ctx| {
            record_temperature(api, sensor)
        }));
    }

    fn on_meter_update(&self, meter: FlowMeter) {
        let flow_manager = Arc::clone(&self.flow_manager);
        let _ = self.lane.submit(TaskFn::boxed("meter-update", move |_ctx| {
            report_meter(flow_manager, meter)
        }));
    }
}

async fn activate_token_user(
    api: Arc<Connection<dyn ApiProvider>>,
    flow_manager: Arc<dyn FlowManager>,
    tap_manager: Arc<dyn TapManager>,
    token: AuthenticationToken,
) -> Result<(), TaskError> {
    let api = api.require()?;
    let user = match api
        .authenticate_user(token.auth_device(), token.token_value())
        .await
    {
        Ok(user) => user,
        Err(e) => {
            warn!(?token, label = e.as_label(), error = %e, "authentication failed; user stays anonymous");
            return Ok(());
        }
    };
    debug!(username = user.username(), "authenticated user");

    for tap in tap_manager.taps() {
        flow_manager.activate_user_at_tap(&tap, user.username());
    }
    Ok(())
}

async fn record_temperature(
    api: Arc<Connection<dyn ApiProvider>>,
    sensor: ThermoSensor,
) -> Result<(), TaskError> {
    debug!(sensor = sensor.name(), temp_c = sensor.temperature_c(), "sensor update");
    let request = RecordTemperatureRequest::new(sensor.name(), sensor.temperature_c() as f32);
    api.require()?.record_temperature_async(request);
    Ok(())
}

async fn report_meter(flow_manager: Arc<dyn FlowManager>, meter: FlowMeter) -> Result<(), TaskError> {
    debug!(meter = meter.name(), ticks = meter.ticks(), "meter update");
    flow_manager.handle_meter_activity(meter.name(), meter.whole_ticks());
    Ok(())
}
