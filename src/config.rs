//! Runtime settings, read from an optional TOML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::DEFAULT_PAGE_SIZE;

/// Errors that may occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("questions_per_page must be at least 1")]
    ZeroPageSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON data file holding categories and questions.
    pub data_path: Option<PathBuf>,
    pub questions_per_page: usize,
    /// Write the data file after every successful create or delete.
    pub autosave: bool,
    /// Fallback tracing filter when `TRIVIA_LOG` is unset.
    pub log_filter: String,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: None,
            questions_per_page: DEFAULT_PAGE_SIZE,
            autosave: true,
            log_filter: "info".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.questions_per_page == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }
}
