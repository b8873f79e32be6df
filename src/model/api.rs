/// User resolved from an authentication token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetail {
    username: String,
}

impl UserDetail {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Temperature sample to be recorded by the API.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTemperatureRequest {
    pub sensor_name: String,
    pub temp_c: f32,
}

impl RecordTemperatureRequest {
    pub fn new(sensor_name: impl Into<String>, temp_c: f32) -> Self {
        Self {
            sensor_name: sensor_name.into(),
            temp_c,
        }
    }
}
