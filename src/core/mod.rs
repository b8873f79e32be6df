//! Runtime core: the controller actor and its wiring.
//!
//! - [`KegbotCore`] owns the lifecycle: start/stop, connection callbacks, reconfiguration
//! - [`KegbotCoreBuilder`] injects collaborators and wires listeners to the queue lane
//! - `bootstrap` first task on every fresh queue (tap registration)
//! - `shutdown` OS termination signals

mod bootstrap;
mod builder;
mod service;
mod shutdown;

pub use builder::KegbotCoreBuilder;
pub use service::{KegbotCore, RunState};
