use std::fmt;

/// Opaque credential presented at a tap (RFID tag, barcode, ...).
///
/// Lives only for the duration of one attach event.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AuthenticationToken {
    auth_device: String,
    token_value: String,
}

impl AuthenticationToken {
    pub fn new(auth_device: impl Into<String>, token_value: impl Into<String>) -> Self {
        Self {
            auth_device: auth_device.into(),
            token_value: token_value.into(),
        }
    }

    /// Kind of reader that produced the token (e.g. "core.rfid").
    pub fn auth_device(&self) -> &str {
        &self.auth_device
    }

    pub fn token_value(&self) -> &str {
        &self.token_value
    }
}

// Token values are credentials; keep them out of logs.
impl fmt::Debug for AuthenticationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationToken")
            .field("auth_device", &self.auth_device)
            .field("token_value", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_value() {
        let token = AuthenticationToken::new("core.rfid", "deadbeef");
        let shown = format!("{token:?}");
        assert!(shown.contains("core.rfid"));
        assert!(!shown.contains("deadbeef"));
    }
}
