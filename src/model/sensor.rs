/// Temperature reading from a named sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermoSensor {
    name: String,
    temperature_c: f64,
}

impl ThermoSensor {
    pub fn new(name: impl Into<String>, temperature_c: f64) -> Self {
        Self {
            name: name.into(),
            temperature_c,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn temperature_c(&self) -> f64 {
        self.temperature_c
    }
}

/// Cumulative tick reading from a flow meter.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowMeter {
    name: String,
    ticks: f64,
}

impl FlowMeter {
    pub fn new(name: impl Into<String>, ticks: f64) -> Self {
        Self {
            name: name.into(),
            ticks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw reading as reported by the hardware.
    pub fn ticks(&self) -> f64 {
        self.ticks
    }

    /// Reading truncated toward zero; negative and NaN readings map to 0.
    ///
    /// Ticks are accumulated by increments, so the fractional part is dropped
    /// rather than rounded.
    pub fn whole_ticks(&self) -> u64 {
        self.ticks as u64
    }
}
