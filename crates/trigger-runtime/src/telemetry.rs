//! Logging setup.

use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, LogConfig};

/// Install the global `fmt` subscriber.
///
/// Targets and thread ids are always on so concurrent reactions can be told
/// apart. Fails if the filter does not parse or a subscriber is already set.
pub fn init_tracing(config: &LogConfig) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| ConfigError::Logging(format!("bad filter {:?}: {}", config.level, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))
}
