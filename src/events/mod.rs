//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the core controller (run state, connection state, preference
//!   changes), the serialized queue worker (task failures/panics), the lane
//!   (dropped submissions) and the bootstrap task (configured / failed).
//! - **Consumers**: hosts and tests via [`KegbotCore::subscribe`](crate::KegbotCore::subscribe).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
