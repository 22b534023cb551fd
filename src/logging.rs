//! Logging initialization.
//!
//! Logs go to stderr so `boleta encode -` and friends can keep stdout for
//! data. The filter comes from `RUST_LOG` if set, otherwise from
//! `BOLETA_LOG_LEVEL` (default `info`).

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::BoletaError;

/// Environment variable holding the fallback log level.
pub const LOG_LEVEL_ENV: &str = "BOLETA_LOG_LEVEL";

/// Install the global subscriber.
///
/// ## Errors
///
/// Returns [`BoletaError::Config`] if the filter cannot be parsed or a
/// subscriber is already installed.
pub fn init() -> Result<(), BoletaError> {
    let log_level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log_level))
        .map_err(|e| BoletaError::Config(format!("Invalid log filter '{}': {}", log_level, e)))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| BoletaError::Config(format!("Failed to install logger: {}", e)))
}
