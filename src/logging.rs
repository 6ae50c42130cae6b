//! Tracing setup for hosts that let the engine own log configuration.
//!
//! Embedding applications with their own subscriber should skip this and the
//! engine's spans will flow into theirs.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::InventoryError;

/// Install a formatted subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` when unset. Fails if a global subscriber is already
/// installed.
pub fn try_init(default_directive: &str) -> Result<(), InventoryError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| {
            InventoryError::ConfigError(format!("failed to install tracing subscriber: {e}"))
        })
}

/// Like [`try_init`] with an `info` default, ignoring an already-installed
/// subscriber.
pub fn init() {
    let _ = try_init("info");
}
