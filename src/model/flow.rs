use std::time::SystemTime;

/// Snapshot of a single pour.
///
/// Owned and mutated by the [`FlowManager`](crate::FlowManager); the core only
/// forwards snapshots to observers and, at the terminal state, to the API.
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    pub id: u64,
    pub tap_name: String,
    pub meter_name: String,
    pub ticks: u64,
    pub volume_ml: f64,
    /// Authenticated user, `None` for anonymous pours.
    pub username: Option<String>,
    pub started_at: SystemTime,
    pub updated_at: SystemTime,
    /// Set once the flow has ended.
    pub ended_at: Option<SystemTime>,
}

impl Flow {
    /// Returns `true` once the Flow Manager has closed this flow.
    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }
}
