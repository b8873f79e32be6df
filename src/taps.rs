//! # Tap registry and tap-configuration store.
//!
//! - [`TapManager`] process-wide registry of dispensing points
//! - [`ConfigurationStore`] persisted tap descriptors, keyed by meter name
//!
//! [`TapRegistry`] and [`TapConfigStore`] are the in-memory implementations the
//! core uses when the embedding application supplies none.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::model::{Tap, TapDetail};

/// Registry of known taps.
pub trait TapManager: Send + Sync + 'static {
    /// Registers `tap`. A tap with the same meter name is replaced in place.
    fn add_tap(&self, tap: Tap);

    /// Registered taps in registration order.
    fn taps(&self) -> Vec<Tap>;
}

/// Persistent store for tap descriptors.
pub trait ConfigurationStore: Send + Sync + 'static {
    fn set_tap_detail(&self, meter_name: &str, detail: TapDetail);
}

/// In-memory [`TapManager`].
#[derive(Default)]
pub struct TapRegistry {
    taps: RwLock<Vec<Tap>>,
}

impl TapRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks a tap up by its meter name.
    pub fn tap_for_meter(&self, meter_name: &str) -> Option<Tap> {
        self.taps
            .read()
            .iter()
            .find(|t| t.meter_name() == meter_name)
            .cloned()
    }
}

impl TapManager for TapRegistry {
    fn add_tap(&self, tap: Tap) {
        let mut taps = self.taps.write();
        match taps.iter_mut().find(|t| t.meter_name() == tap.meter_name()) {
            Some(slot) => *slot = tap,
            None => taps.push(tap),
        }
    }

    fn taps(&self) -> Vec<Tap> {
        self.taps.read().clone()
    }
}

/// In-memory [`ConfigurationStore`].
#[derive(Default)]
pub struct TapConfigStore {
    details: RwLock<HashMap<String, TapDetail>>,
}

impl TapConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tap_detail(&self, meter_name: &str) -> Option<TapDetail> {
        self.details.read().get(meter_name).cloned()
    }

    pub fn len(&self) -> usize {
        self.details.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.details.read().is_empty()
    }
}

impl ConfigurationStore for TapConfigStore {
    fn set_tap_detail(&self, meter_name: &str, detail: TapDetail) {
        self.details.write().insert(meter_name.to_owned(), detail);
    }
}
