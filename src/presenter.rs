//! # Presentation surface.
//!
//! The core reports pour progress and connection notices to whatever UI the
//! embedding application runs. [`LogPresenter`] writes everything to the log
//! and is used when no presenter is configured.
//!
//! ## Example output
//! ```text
//! INFO pour start flow=3 tap="Left" ticks=0
//! INFO pour update flow=3 tap="Left" ticks=41 volume_ml=90.2
//! INFO notice: api connection established
//! ```

use tracing::info;

use crate::model::Flow;

/// Ordered broadcast emitted while a pour is in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum Broadcast {
    PourStart(Flow),
    PourUpdate(Flow),
}

impl Broadcast {
    pub fn flow(&self) -> &Flow {
        match self {
            Broadcast::PourStart(flow) | Broadcast::PourUpdate(flow) => flow,
        }
    }
}

/// Receiver of user-visible output.
pub trait Presenter: Send + Sync + 'static {
    /// Delivers `msg` to local observers, in submission order.
    fn send_ordered_broadcast(&self, msg: Broadcast);

    /// Short diagnostic notice (connection established/lost).
    fn notice(&self, _text: &str) {}

    /// The core started running and wants to stay resident.
    fn enter_foreground(&self) {}

    /// The core stopped.
    fn exit_foreground(&self) {}
}

/// [`Presenter`] that writes to the `tracing` log.
#[derive(Default)]
pub struct LogPresenter;

impl LogPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Presenter for LogPresenter {
    fn send_ordered_broadcast(&self, msg: Broadcast) {
        match &msg {
            Broadcast::PourStart(f) => {
                info!(flow = f.id, tap = %f.tap_name, ticks = f.ticks, "pour start")
            }
            Broadcast::PourUpdate(f) => info!(
                flow = f.id,
                tap = %f.tap_name,
                ticks = f.ticks,
                volume_ml = f.volume_ml,
                "pour update"
            ),
        }
    }

    fn notice(&self, text: &str) {
        info!("notice: {text}");
    }

    fn enter_foreground(&self) {
        info!("core in foreground");
    }

    fn exit_foreground(&self) {
        info!("core left foreground");
    }
}
