//! Editor configuration.
//!
//! Loaded from `<data dir>/raw-editor/config.json`. Every section falls
//! back to its defaults, so a partial file is fine and a missing file means
//! "all defaults".

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::state::edit::AdjustmentPatch;

/// Debounce window before the render queue starts draining
pub const DEFAULT_DEBOUNCE_MS: u64 = 5;

/// Options for the single-image history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HistoryOptions {
    /// Maximum timeline length. `None` (or `Some(0)` when built in code)
    /// keeps everything; config files must use at least 1.
    pub max_size: Option<usize>,
    /// Start every session (and every reset) in batch mode.
    pub batch_by_default: bool,
    /// Log rejected operations at `warn` level.
    pub dev_warnings: bool,
}

/// Options for the multi-image selective history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BatchOptions {
    /// Values applied on top of the all-zero default by `reset`.
    pub default_overrides: AdjustmentPatch,
    /// Maximum timeline length. `None` (or `Some(0)` when built in code)
    /// keeps everything; config files must use at least 1.
    pub max_size: Option<usize>,
    /// Log rejected operations at `warn` level.
    pub dev_warnings: bool,
}

/// Options for the render queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct QueueOptions {
    /// Quiet period after the last request before draining starts.
    pub debounce_ms: u64,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// Top-level editor configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryOptions,
    pub batch: BatchOptions,
    pub queue: QueueOptions,
}

impl EditorConfig {
    /// The config file path: `<data dir>/raw-editor/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::data_dir().or_else(dirs::home_dir)?;
        path.push("raw-editor");
        path.push("config.json");
        Some(path)
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        log::debug!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Like [`EditorConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Write the config as pretty JSON, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.history.max_size == Some(0) {
            return Err(ConfigError::Invalid(
                "history max-size must be at least 1".to_string(),
            ));
        }
        if self.batch.max_size == Some(0) {
            return Err(ConfigError::Invalid(
                "batch max-size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
