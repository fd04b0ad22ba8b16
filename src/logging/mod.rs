// Logging module for structured logging using the tracing crate

use std::error::Error;

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for structured logging.
///
/// The subscriber is configured with:
/// - JSON formatting for easy parsing by log aggregation systems
/// - Level filtering from `RUST_LOG`, defaulting to `info`
/// - Output to stdout for container/cloud-native deployments
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_subscriber() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .try_init()
        .map_err(|e| -> Box<dyn Error> { e })?;

    Ok(())
}
