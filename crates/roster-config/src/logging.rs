//! Tracing subscriber setup.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "ROSTER_LOG";

fn default_filter() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"roster_db=debug,warn"`.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

/// Install a global fmt subscriber. `ROSTER_LOG` wins over `config.filter`.
///
/// # Errors
///
/// Returns `ConfigError::Logging` if the filter does not parse or a global
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = match tracing_subscriber::EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(&config.filter)
            .map_err(|e| ConfigError::Logging(format!("invalid filter '{}': {e}", config.filter)))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| ConfigError::Logging(error.to_string()))
}
