//! # Flow Manager contract and flow-lifecycle handling.
//!
//! The Flow Manager owns pour state (which user is active at which tap, how
//! many ticks each meter has produced, when a pour goes idle). The core only
//! feeds it meter readings and user activations, and reacts to the lifecycle
//! notifications it emits.

mod listener;

pub use listener::FlowListener;

use std::sync::Arc;
use std::time::Duration;

use crate::model::{Flow, Tap};

/// Receiver of flow lifecycle notifications.
pub trait FlowEventSink: Send + Sync + 'static {
    fn on_flow_start(&self, flow: Flow);
    fn on_flow_update(&self, flow: Flow);
    /// Terminal notification; `flow` is final.
    fn on_flow_end(&self, flow: Flow);
}

/// Pour-state owner. Process-wide, shared with whatever else needs it.
pub trait FlowManager: Send + Sync + 'static {
    /// Marks `username` as the active drinker at `tap`.
    fn activate_user_at_tap(&self, tap: &Tap, username: &str);

    /// Reports the cumulative whole-tick reading of `meter_name`.
    fn handle_meter_activity(&self, meter_name: &str, ticks: u64);

    fn add_flow_listener(&self, listener: Arc<dyn FlowEventSink>);

    /// Removes `listener` (matched by `Arc::ptr_eq`).
    fn remove_flow_listener(&self, listener: &Arc<dyn FlowEventSink>);

    /// Idle period after which an inactive flow ends.
    fn set_default_idle_time(&self, idle: Duration);

    /// Ends all active flows and stops idle tracking.
    fn stop(&self);
}
