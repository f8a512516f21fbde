//! Server configuration.
//!
//! Settings are layered, lowest precedence first:
//!   1. Built-in defaults.
//!   2. A TOML file: the `--config` path, or `symnav/config.toml` in the
//!      platform config directory.
//!   3. Command-line flags.
//!   4. The client's `initializationOptions`.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How descriptor enrichment locates a package by import path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FindPackageStrategy {
    /// Look the import path up as-is.
    #[default]
    Exact,
    /// Prefer a copy vendored under the workspace root.
    Vendored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Directory holding analysis snapshots.
    pub index_dir: Option<PathBuf>,
    pub find_package: FindPackageStrategy,
    /// Attach symbol descriptors to resolved declarations.
    pub enrich: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_dir: None,
            find_package: FindPackageStrategy::Exact,
            enrich: true,
        }
    }
}

/// Partial settings, as sent in `initializationOptions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ConfigOverrides {
    index_dir: Option<PathBuf>,
    find_package: Option<FindPackageStrategy>,
    enrich: Option<bool>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid initialization options: {0}")]
    Options(#[from] serde_json::Error),
}

impl Config {
    /// Default location of the config file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        use etcetera::BaseStrategy;

        let strategy = etcetera::choose_base_strategy().ok()?;
        Some(strategy.config_dir().join("symnav").join("config.toml"))
    }

    /// Load the config file.  An explicit path must exist; a missing file
    /// at the default location yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Merge the client's `initializationOptions`.  Fields the client does
    /// not mention keep their current value.
    pub fn apply_initialization_options(
        &mut self,
        options: serde_json::Value,
    ) -> Result<(), ConfigError> {
        if options.is_null() {
            return Ok(());
        }
        let overrides: ConfigOverrides = serde_json::from_value(options)?;
        if let Some(dir) = overrides.index_dir {
            self.index_dir = Some(dir);
        }
        if let Some(strategy) = overrides.find_package {
            self.find_package = strategy;
        }
        if let Some(enrich) = overrides.enrich {
            self.enrich = enrich;
        }
        Ok(())
    }
}
