//! # Hardware collaborator contract and event handling.
//!
//! - [`HardwareProvider`] handle to the bound hardware interface (USB/serial/RFID
//!   drivers live behind it)
//! - [`HardwareEventSink`] capability the provider calls back into
//! - [`HardwareListener`] the core's sink: one queued task per notification

mod listener;

pub use listener::HardwareListener;

use std::sync::Arc;

use crate::model::{AuthenticationToken, FlowMeter, ThermoSensor};

/// Receiver of hardware notifications.
///
/// Called on threads chosen by the hardware provider; implementations must not block.
pub trait HardwareEventSink: Send + Sync + 'static {
    /// A token was presented at `tap_name` and stays attached.
    fn on_token_attached(&self, token: AuthenticationToken, tap_name: &str);

    /// A previously attached token went away.
    fn on_token_removed(&self, token: AuthenticationToken, tap_name: &str);

    /// A token was swiped (seen once, not held).
    fn on_token_swiped(&self, token: AuthenticationToken, tap_name: &str);

    /// New reading from a temperature sensor.
    fn on_thermo_sensor_update(&self, sensor: ThermoSensor);

    /// New cumulative reading from a flow meter.
    fn on_meter_update(&self, meter: FlowMeter);
}

/// Handle to the hardware provider, valid while its connection is `Bound`.
pub trait HardwareProvider: Send + Sync + 'static {
    /// Starts delivering notifications to `listener`.
    fn attach_listener(&self, listener: Arc<dyn HardwareEventSink>);

    /// Stops delivering notifications to `listener` (matched by `Arc::ptr_eq`).
    fn detach_listener(&self, listener: &Arc<dyn HardwareEventSink>);
}
