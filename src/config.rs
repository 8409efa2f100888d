use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::poller::{clamp_frequency, DEFAULT_POLLING_FREQUENCY};

/// Path of an optional JSON config file.
pub const CONFIG_PATH_VAR: &str = "SMS_MOTION_CONFIG";
/// Overrides `polling_frequency_hz`.
pub const POLL_HZ_VAR: &str = "SMS_MOTION_POLL_HZ";
/// Overrides `log_level`.
pub const LOG_LEVEL_VAR: &str = "SMS_MOTION_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{var} is not a number: {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("unknown log level {0:?} (expected trace, debug, info, warn or error)")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Requested rate; clamped to [0.001, 1000] Hz when applied.
    pub polling_frequency_hz: f64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            polling_frequency_hz: DEFAULT_POLLING_FREQUENCY,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_json(text: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    /// File named by `SMS_MOTION_CONFIG` (if set), then env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var_os(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        base.with_overrides(|var| std::env::var(var).ok())
    }

    /// Applies overrides looked up by variable name.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(POLL_HZ_VAR) {
            self.polling_frequency_hz =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber {
                        var: POLL_HZ_VAR,
                        value,
                    })?;
        }
        if let Some(value) = lookup(LOG_LEVEL_VAR) {
            self.log_level = value;
        }
        // fail early rather than at subscriber setup
        self.max_level()?;
        Ok(self)
    }

    pub fn polling_frequency(&self) -> f64 {
        clamp_frequency(self.polling_frequency_hz)
    }

    pub fn max_level(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }
}
