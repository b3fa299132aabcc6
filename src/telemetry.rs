//! Logging setup for the binary.

use tracing_subscriber::EnvFilter;

use crate::error::{EngineError, EngineResult};

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `log_level` is used as the filter.
pub fn init(log_level: &str) -> EngineResult<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level).map_err(|e| EngineError::InvalidConfig {
            message: format!("invalid log level/filter '{log_level}': {e}"),
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| EngineError::InvalidConfig {
            message: format!("logging already initialised: {e}"),
        })
}
