// SPDX-License-Identifier: Apache-2.0

//! Instrumentation configuration
//!
//! Defaults work out of the box; a JSON file and `QOREDB_PERF_*` environment
//! variables can override them.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::driver::url::DEFAULT_PREFIX;
use crate::timer::{TaskTimers, ThreadTimers, TimerContext};

pub const ENV_URL_PREFIX: &str = "QOREDB_PERF_URL_PREFIX";
pub const ENV_TIMER_SCOPE: &str = "QOREDB_PERF_TIMER_SCOPE";
pub const ENV_SLOW_MS: &str = "QOREDB_PERF_SLOW_MS";
pub const ENV_LOG_FORMAT: &str = "QOREDB_PERF_LOG_FORMAT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },

    #[error("Invalid URL prefix '{prefix}': expected ASCII letters, digits or '_'")]
    InvalidPrefix { prefix: String },
}

/// Which execution context owns a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerScope {
    #[default]
    Thread,
    Task,
}

impl FromStr for TimerScope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "thread" => Ok(Self::Thread),
            "task" => Ok(Self::Task),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerfConfig {
    /// Scheme prefix marking instrumented URLs (`<prefix>-<scheme>:...`)
    pub url_prefix: String,
    pub timer_scope: TimerScope,
    /// Timed operations at least this slow are logged as warnings
    pub slow_operation_ms: Option<u64>,
    pub log_format: LogFormat,
}

impl Default for PerfConfig {
    fn default() -> Self {
        Self {
            url_prefix: DEFAULT_PREFIX.to_string(),
            timer_scope: TimerScope::default(),
            slow_operation_ms: None,
            log_format: LogFormat::default(),
        }
    }
}

impl PerfConfig {
    /// Loads configuration from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: PerfConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        debug!("Loaded instrumentation config from {:?}", path);
        Ok(config)
    }

    /// Defaults overridden by `QOREDB_PERF_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, keyed by environment variable name
    pub fn apply_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let invalid = |key: &str, value: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        if let Some(prefix) = lookup(ENV_URL_PREFIX) {
            self.url_prefix = prefix.trim().to_string();
        }
        if let Some(scope) = lookup(ENV_TIMER_SCOPE) {
            self.timer_scope = scope.parse().map_err(|_| invalid(ENV_TIMER_SCOPE, &scope))?;
        }
        if let Some(slow) = lookup(ENV_SLOW_MS) {
            let slow = slow.trim();
            self.slow_operation_ms = if slow.is_empty() {
                None
            } else {
                Some(slow.parse().map_err(|_| invalid(ENV_SLOW_MS, slow))?)
            };
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.log_format = format.parse().map_err(|_| invalid(ENV_LOG_FORMAT, &format))?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid = !self.url_prefix.is_empty()
            && self
                .url_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidPrefix {
                prefix: self.url_prefix.clone(),
            })
        }
    }

    /// Timer handle for the configured scope
    pub fn timers(&self) -> Arc<dyn TimerContext> {
        match self.timer_scope {
            TimerScope::Thread => Arc::new(ThreadTimers),
            TimerScope::Task => Arc::new(TaskTimers),
        }
    }

    pub fn slow_operation_threshold(&self) -> Option<Duration> {
        self.slow_operation_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PerfConfig::default();
        assert_eq!(config.url_prefix, "perf");
        assert_eq!(config.timer_scope, TimerScope::Thread);
        assert_eq!(config.slow_operation_threshold(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = PerfConfig::default()
            .apply_env(env(&[
                (ENV_URL_PREFIX, "timed"),
                (ENV_TIMER_SCOPE, "Task"),
                (ENV_SLOW_MS, "250"),
                (ENV_LOG_FORMAT, "json"),
            ]))
            .unwrap();

        assert_eq!(config.url_prefix, "timed");
        assert_eq!(config.timer_scope, TimerScope::Task);
        assert_eq!(
            config.slow_operation_threshold(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_env_rejects_bad_values() {
        let err = PerfConfig::default()
            .apply_env(env(&[(ENV_TIMER_SCOPE, "fiber")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ENV_TIMER_SCOPE));

        let err = PerfConfig::default()
            .apply_env(env(&[(ENV_SLOW_MS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = PerfConfig::default()
            .apply_env(env(&[(ENV_URL_PREFIX, "per-f")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPrefix { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"url_prefix": "trace", "slow_operation_ms": 5}}"#).unwrap();

        let config = PerfConfig::load(file.path()).unwrap();
        assert_eq!(config.url_prefix, "trace");
        assert_eq!(config.slow_operation_ms, Some(5));
        assert_eq!(config.timer_scope, TimerScope::Thread);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            PerfConfig::load(&missing).unwrap_err(),
            ConfigError::Read { .. }
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            PerfConfig::load(&broken).unwrap_err(),
            ConfigError::Parse { .. }
        ));

        let empty_prefix = dir.path().join("empty.json");
        std::fs::write(&empty_prefix, r#"{"url_prefix": ""}"#).unwrap();
        assert!(matches!(
            PerfConfig::load(&empty_prefix).unwrap_err(),
            ConfigError::InvalidPrefix { .. }
        ));
    }
}
