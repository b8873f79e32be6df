//! # Logging setup for host binaries.
//!
//! The library itself only emits `tracing` events. Hosts without a subscriber
//! of their own can call [`init`]:
//! - level filter from `RUST_LOG`, falling back to `default_directive`
//! - compact fmt output on stderr with targets

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::CoreError;

/// Installs the global fmt subscriber.
///
/// # Errors
/// [`CoreError::Logging`] if the directive does not parse or a global
/// subscriber is already installed.
pub fn init(default_directive: &str) -> Result<(), CoreError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive).map_err(|e| CoreError::Logging {
            reason: e.to_string(),
        })?,
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| CoreError::Logging {
            reason: e.to_string(),
        })
}
