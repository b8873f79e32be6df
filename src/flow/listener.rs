//! # FlowListener: flow lifecycle → queued tasks.
//!
//! ```text
//! on_flow_start  ──► task "flow-start":  ordered broadcast PourStart
//! on_flow_update ──► task "flow-update": ordered broadcast PourUpdate
//! on_flow_end    ──► task "flow-end":    record drink (fire-and-forget)
//! ```
//!
//! Start and update never touch the API, so they also run while it is
//! disconnected as long as a queue exists.
//!
//! While the core runs its stop sequence the queue is about to be discarded,
//! so flows ended by `FlowManager::stop` are recorded directly on the calling
//! thread instead (see [`FlowListener::set_draining`]).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use super::FlowEventSink;
use crate::api::ApiProvider;
use crate::connection::Connection;
use crate::error::TaskError;
use crate::model::Flow;
use crate::presenter::{Broadcast, Presenter};
use crate::queue::Lane;
use crate::tasks::TaskFn;

/// The core's [`FlowEventSink`].
pub struct FlowListener {
    lane: Arc<Lane>,
    api: Arc<Connection<dyn ApiProvider>>,
    presenter: Arc<dyn Presenter>,
    draining: AtomicBool,
}

impl FlowListener {
    pub fn new(
        lane: Arc<Lane>,
        api: Arc<Connection<dyn ApiProvider>>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            lane,
            api,
            presenter,
            draining: AtomicBool::new(false),
        }
    }

    /// While set, `on_flow_end` records the drink immediately instead of queuing it.
    pub(crate) fn set_draining(&self, on: bool) {
        self.draining.store(on, Ordering::SeqCst);
    }

    fn broadcast(&self, name: &'static str, msg: Broadcast) {
        let presenter = Arc::clone(&self.presenter);
        let _ = self.lane.submit(TaskFn::boxed(name, move |_ctx| async move {
            presenter.send_ordered_broadcast(msg);
            Ok::<(), TaskError>(())
        }));
    }
}

impl FlowEventSink for FlowListener {
    fn on_flow_start(&self, flow: Flow) {
        self.broadcast("flow-start", Broadcast::PourStart(flow));
    }

    fn on_flow_update(&self, flow: Flow) {
        self.broadcast("flow-update", Broadcast::PourUpdate(flow));
    }

    fn on_flow_end(&self, flow: Flow) {
        if self.draining.load(Ordering::SeqCst) {
            if let Err(e) = record_drink(&self.api, flow) {
                warn!(label = e.as_label(), error = %e, "drink ended during stop not recorded");
            }
            return;
        }
        let api = Arc::clone(&self.api);
        let _ = self.lane.submit(TaskFn::boxed("flow-end", move |_ctx| async move {
            record_drink(&api, flow)
        }));
    }
}

fn record_drink(api: &Connection<dyn ApiProvider>, flow: Flow) -> Result<(), TaskError> {
    let api = api.require()?;
    info!(flow = flow.id, tap = %flow.tap_name, ticks = flow.ticks, "recording drink");
    api.record_drink_async(flow);
    Ok(())
}
