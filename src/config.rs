//! Configuration for Shiksha Setu
//!
//! Settings come from an optional `setu.json` file. Anything missing takes its
//! default, and the compiler API key can be supplied through the environment.

use crate::engagement::{DEFAULT_AVERAGE_WINDOW_SECS, DEFAULT_HISTORY_CAPACITY};
use crate::error::SetuError;
use crate::locale::Locale;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The default config file name
pub const CONFIG_FILE_NAME: &str = "setu.json";

/// Environment variable holding the compiler API key
pub const COMPILER_API_KEY_ENV: &str = "JUDGE0_API_KEY";

const fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

const fn default_average_window_secs() -> i64 {
    DEFAULT_AVERAGE_WINDOW_SECS
}

fn default_store_path() -> String {
    ".setu/store.json".to_string()
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetuConfig {
    /// Engagement history size (records)
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Window for average engagement (seconds)
    #[serde(default = "default_average_window_secs")]
    pub average_window_secs: i64,

    /// Locale used until a saved preference is loaded
    #[serde(default)]
    pub default_locale: Locale,

    /// Key-value store file for preferences and snippets
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Remote compiler settings
    #[serde(default)]
    pub compiler: CompilerConfig,
}

/// Remote compiler settings
///
/// The key only gates a remote compiler supplied by the embedding application;
/// without one, execution stays local.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerConfig {
    /// Credential for the remote compiler; never written back to disk
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for SetuConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            average_window_secs: default_average_window_secs(),
            default_locale: Locale::default(),
            store_path: default_store_path(),
            compiler: CompilerConfig::default(),
        }
    }
}

impl SetuConfig {
    /// Load configuration from a file; a missing file yields defaults
    ///
    /// # Errors
    ///
    /// Returns `SetuError::Config` if the file cannot be read, is not valid JSON,
    /// or fails validation.
    pub fn load_from_file(path: &Path) -> Result<Self, SetuError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(SetuError::Config(format!(
                    "{}: failed to read file: {}",
                    path.display(),
                    e
                )))
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| SetuError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `setu.json` from a directory
    pub fn load_from_dir(dir: &Path) -> Result<Self, SetuError> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Fill the compiler API key from the environment if not already set
    pub fn apply_env(mut self) -> Self {
        if self.compiler.api_key.is_none() {
            self.compiler.api_key = std::env::var(COMPILER_API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
        self
    }

    /// Check that all values are usable
    pub fn validate(&self) -> Result<(), SetuError> {
        if self.history_capacity == 0 {
            return Err(SetuError::Config(
                "historyCapacity must be greater than 0".to_string(),
            ));
        }
        if self.average_window_secs <= 0 {
            return Err(SetuError::Config(
                "averageWindowSecs must be greater than 0".to_string(),
            ));
        }
        if Duration::try_seconds(self.average_window_secs).is_none() {
            return Err(SetuError::Config(format!(
                "averageWindowSecs {} is out of range",
                self.average_window_secs
            )));
        }
        if self.store_path.trim().is_empty() {
            return Err(SetuError::Config("storePath must not be empty".to_string()));
        }
        Ok(())
    }

    /// Averaging window; an out-of-range value falls back to the default
    pub fn average_window(&self) -> Duration {
        Duration::try_seconds(self.average_window_secs)
            .filter(|window| *window > Duration::zero())
            .unwrap_or_else(|| Duration::seconds(DEFAULT_AVERAGE_WINDOW_SECS))
    }
}
