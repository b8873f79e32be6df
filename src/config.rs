//! # Runtime configuration.
//!
//! Provides [`Config`], the static tuning of the core runtime. Values that the
//! operator changes at runtime (run flag, credentials, idle timeout) live in the
//! [`PreferenceStore`](crate::PreferenceStore) instead.
//!
//! ## Sentinel values
//! - `bind_timeout = 0s` → wait for a collaborator connection forever
//! - `queue_capacity`, `bus_capacity` are clamped to a minimum of 1

use std::time::Duration;

/// Static configuration for the core runtime.
///
/// ## Field semantics
/// - `queue_capacity`: Bound of the serialized task queue (min 1)
/// - `bus_capacity`: Event bus ring buffer size (min 1)
/// - `bind_timeout`: Maximum wait for a collaborator connection (`0s` = forever)
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the serialized task queue.
    ///
    /// A submission that finds the queue full is dropped, logged and reported
    /// as `EventKind::TaskDropped`. Hardware callbacks never block on submit.
    pub queue_capacity: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// How long a bind attempt may stay in `Binding` before it is abandoned.
    ///
    /// - `Duration::ZERO` = no limit
    /// - `> 0` = on expiry the collaborator returns to `Unbound` and
    ///   `EventKind::BindFailed` is published
    pub bind_timeout: Duration,
}

impl Config {
    /// Returns the bind timeout as an `Option` (`None` = wait forever).
    #[inline]
    pub fn bind_timeout(&self) -> Option<Duration> {
        if self.bind_timeout == Duration::ZERO {
            None
        } else {
            Some(self.bind_timeout)
        }
    }

    /// Returns the queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Returns the bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `queue_capacity = 4096`
    /// - `bus_capacity = 1024`
    /// - `bind_timeout = 30s`
    fn default() -> Self {
        Self {
            queue_capacity: 4096,
            bus_capacity: 1024,
            bind_timeout: Duration::from_secs(30),
        }
    }
}
