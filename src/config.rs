// ABOUTME: Configuration loading and validation for the rollbook binary.
// ABOUTME: Reads ROLLBOOK_* environment variables and applies command-line overrides.

use std::path::PathBuf;

use rollbook_core::{DEFAULT_KEY, validate_key};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("storage key {0:?} is invalid: use letters, digits, '-' or '_'")]
    InvalidKey(String),
}

/// Where and under which key the roster is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbookConfig {
    pub home: PathBuf,
    pub storage_key: String,
}

impl RollbookConfig {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - ROLLBOOK_HOME: data directory root (default: ~/.rollbook)
    /// - ROLLBOOK_STORAGE_KEY: key the collection is stored under (default: students)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns the value of an
    /// environment variable if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let home = lookup("ROLLBOOK_HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                lookup("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
                    .join(".rollbook")
            });

        let storage_key = lookup("ROLLBOOK_STORAGE_KEY")
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| DEFAULT_KEY.to_string());

        Self { home, storage_key }.validated()
    }

    /// Replace values given on the command line.
    pub fn with_overrides(
        mut self,
        home: Option<PathBuf>,
        storage_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(home) = home {
            self.home = home;
        }
        if let Some(key) = storage_key {
            self.storage_key = key;
        }
        self.validated()
    }

    /// Directory holding the stored collections.
    pub fn data_dir(&self) -> PathBuf {
        self.home.join("data")
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if validate_key(&self.storage_key).is_err() {
            return Err(ConfigError::InvalidKey(self.storage_key));
        }
        Ok(self)
    }
}
