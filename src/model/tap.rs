//! Taps and the descriptors the API returns for them.

/// A physical dispensing point.
///
/// Registered with the [`TapManager`](crate::TapManager) during bootstrap and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Tap {
    name: String,
    ml_per_tick: f64,
    meter_name: String,
    relay_name: Option<String>,
}

impl Tap {
    /// Creates a tap. An empty `relay_name` means the tap has no relay.
    pub fn new(
        name: impl Into<String>,
        ml_per_tick: f64,
        meter_name: impl Into<String>,
        relay_name: impl Into<String>,
    ) -> Self {
        let relay_name = relay_name.into();
        Self {
            name: name.into(),
            ml_per_tick,
            meter_name: meter_name.into(),
            relay_name: (!relay_name.is_empty()).then_some(relay_name),
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calibration factor: volume (ml) per meter tick.
    pub fn ml_per_tick(&self) -> f64 {
        self.ml_per_tick
    }

    /// Identifier of the flow meter feeding this tap.
    pub fn meter_name(&self) -> &str {
        &self.meter_name
    }

    /// Identifier of the valve relay, if the tap has one.
    pub fn relay_name(&self) -> Option<&str> {
        self.relay_name.as_deref()
    }
}

impl From<&KegTap> for Tap {
    fn from(info: &KegTap) -> Self {
        Tap::new(
            info.description.clone(),
            info.ml_per_tick,
            info.meter_name.clone(),
            info.relay_name.clone(),
        )
    }
}

/// Tap record as served by the API.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KegTap {
    pub id: u32,
    pub description: String,
    pub ml_per_tick: f64,
    pub meter_name: String,
    pub relay_name: String,
}

/// Keg currently connected to a tap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Keg {
    pub id: u32,
    pub beverage_name: String,
    pub volume_ml_remain: f64,
}

/// Full tap descriptor: tap record plus the keg on it.
///
/// Stored verbatim in the [`ConfigurationStore`](crate::ConfigurationStore),
/// keyed by meter name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TapDetail {
    pub tap: KegTap,
    pub keg: Option<Keg>,
}

/// Answer of the "fetch all taps" call, in server order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TapDetailSet {
    pub taps: Vec<TapDetail>,
}
