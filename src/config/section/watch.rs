//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! debounce_ms = 50          # Quiet period before a re-render
//! rewatch_delay_ms = 100    # Wait after rename/remove before re-watching
//! ```

use serde::Deserialize;

use crate::watch::WatchTiming;

/// File watcher timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub debounce_ms: u64,
    pub rewatch_delay_ms: u64,
}

impl WatchConfig {
    pub fn timing(&self) -> WatchTiming {
        WatchTiming::from_millis(self.debounce_ms, self.rewatch_delay_ms)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            rewatch_delay_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::PreviewConfig;

    #[test]
    fn test_watch_config_defaults() {
        let timing = PreviewConfig::from_str("").unwrap().watch.timing();
        assert_eq!(timing.debounce, Duration::from_millis(50));
        assert_eq!(timing.rewatch_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_watch_config_override() {
        let config = PreviewConfig::from_str("[watch]\ndebounce_ms = 200").unwrap();
        assert_eq!(config.watch.debounce_ms, 200);
        assert_eq!(config.watch.rewatch_delay_ms, 100);
    }
}
