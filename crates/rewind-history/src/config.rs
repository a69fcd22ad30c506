/// Configuration for the history engine: defaults, JSON load/save, sanitizing.
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Maximum number of snapshots kept in `past` before the oldest is evicted.
const DEFAULT_MAX_LENGTH: usize = 20;

/// Throttle window in milliseconds. Zero disables throttling.
const DEFAULT_THROTTLE_MS: u64 = 0;

/// Configuration for a single history instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Bound on the number of past snapshots.
    pub max_length: usize,
    /// After a recorded push, further pushes are dropped for this many
    /// milliseconds.
    pub throttle_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            throttle_ms: DEFAULT_THROTTLE_MS,
        }
    }
}

impl HistoryConfig {
    /// Shorthand for a config with the given bound and no throttling.
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            ..Self::default()
        }
    }

    /// Throttle window as a `Duration`, or `None` when throttling is off.
    pub fn throttle(&self) -> Option<Duration> {
        (self.throttle_ms > 0).then(|| Duration::from_millis(self.throttle_ms))
    }

    /// Reads a JSON config file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read history config at {}", path.display()))?;
        let mut config: HistoryConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse history config at {}", path.display()))?;
        config.sanitize();
        Ok(config)
    }

    /// Like [`HistoryConfig::load`], but falls back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{e:#}; using default history config");
                Self::default()
            }
        }
    }

    /// Saves the config to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write history config to {}", path.display()))
    }

    /// Resets values that would make the history useless.
    pub fn sanitize(&mut self) {
        if self.max_length == 0 {
            tracing::warn!("max_length of 0 would discard all history; using 1");
            self.max_length = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HistoryConfig::default();
        assert_eq!(config.max_length, 20);
        assert_eq!(config.throttle_ms, 0);
        assert!(config.throttle().is_none());
    }

    #[test]
    fn test_throttle_duration() {
        let config = HistoryConfig {
            max_length: 5,
            throttle_ms: 250,
        };
        assert_eq!(config.throttle(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_sanitize_fixes_zero_max_length() {
        let mut config = HistoryConfig::with_max_length(0);
        config.sanitize();
        assert_eq!(config.max_length, 1);
    }

    #[test]
    fn test_sanitize_keeps_valid_values() {
        let mut config = HistoryConfig {
            max_length: 7,
            throttle_ms: 30,
        };
        config.sanitize();
        assert_eq!(config.max_length, 7);
        assert_eq!(config.throttle_ms, 30);
    }

    #[test]
    fn test_load_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("history.json");
        std::fs::write(&path, r#"{ "throttle_ms": 100 }"#).expect("write");

        let config = HistoryConfig::load(&path).expect("load");
        assert_eq!(config.max_length, 20);
        assert_eq!(config.throttle_ms, 100);
    }

    #[test]
    fn test_load_sanitizes() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("history.json");
        std::fs::write(&path, r#"{ "max_length": 0 }"#).expect("write");

        let config = HistoryConfig::load(&path).expect("load");
        assert_eq!(config.max_length, 1);
    }

    #[test]
    fn test_load_invalid_json_is_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("history.json");
        std::fs::write(&path, "not json").expect("write");

        assert!(HistoryConfig::load(&path).is_err());
        assert_eq!(HistoryConfig::load_or_default(&path), HistoryConfig::default());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("missing.json");
        assert_eq!(HistoryConfig::load_or_default(&path), HistoryConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("history.json");
        let config = HistoryConfig {
            max_length: 3,
            throttle_ms: 40,
        };
        config.save(&path).expect("save");
        assert_eq!(HistoryConfig::load(&path).expect("load"), config);
    }
}
