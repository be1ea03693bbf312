//! Record store location.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    "roster.db".to_string()
}

const fn default_busy_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// libSQL database file, or `":memory:"` for a throwaway store.
    #[serde(default = "default_path")]
    pub path: String,

    /// How long a transaction waits for another connection's write lock
    /// before failing with a storage error.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_path_is_detected() {
        assert!(!DatabaseConfig::default().is_in_memory());
        let config = DatabaseConfig {
            path: ":memory:".into(),
            ..DatabaseConfig::default()
        };
        assert!(config.is_in_memory());
    }

    #[test]
    fn busy_timeout_defaults_to_five_seconds() {
        assert_eq!(DatabaseConfig::default().busy_timeout(), Duration::from_secs(5));
    }
}
