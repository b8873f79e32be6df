//! # Domain data carried through the core.
//!
//! - [`Tap`], [`KegTap`], [`TapDetail`], [`TapDetailSet`] dispensing points and their API descriptors
//! - [`Flow`] snapshot of a pour, owned by the Flow Manager
//! - [`AuthenticationToken`] credential presented at a tap
//! - [`ThermoSensor`], [`FlowMeter`] hardware readings
//! - [`UserDetail`], [`RecordTemperatureRequest`] API payloads
//!
//! The core never mutates these; it only forwards them between collaborators.

mod api;
mod flow;
mod sensor;
mod tap;
mod token;

pub use api::{RecordTemperatureRequest, UserDetail};
pub use flow::Flow;
pub use sensor::{FlowMeter, ThermoSensor};
pub use tap::{Keg, KegTap, Tap, TapDetail, TapDetailSet};
pub use token::AuthenticationToken;
