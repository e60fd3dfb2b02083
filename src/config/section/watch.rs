//! `[watch]` section configuration.
//!
//! ```toml
//! [watch]
//! debounce_ms = 100
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// File watcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiet period before a batch of changes is processed.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 100 }
    }
}

impl WatchConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_watch_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.watch.debounce(), Duration::from_millis(100));
    }

    #[test]
    fn test_watch_override() {
        let config = test_parse_config("[watch]\ndebounce_ms = 250");
        assert_eq!(config.watch.debounce_ms, 250);
    }
}
