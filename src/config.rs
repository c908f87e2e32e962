//! User configuration and preferences

use crate::error::{CatswpError, Result};
use crate::source::DEFAULT_SOURCE_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;
pub const DEFAULT_FINISH_DELAY_MS: u64 = 300;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_DRAG_THRESHOLD: u16 = 10;

/// Persisted knobs. Every field falls back to its default when missing from the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Number of cards fetched per session
    pub batch_size: usize,
    /// URL template for the image source; `{rand}` is replaced per request
    pub source_url: String,
    /// Grace period before the first card accepts input
    pub settle_delay_ms: u64,
    /// Pause between the last decision and the collection view
    pub finish_delay_ms: u64,
    pub request_timeout_secs: u64,
    /// Where saved cats go (OS download dir when unset)
    pub save_dir: Option<PathBuf>,
    /// Share by opening links with the system handler instead of the clipboard
    pub open_links: bool,
    /// Columns a card must be dragged before it counts as a swipe
    pub drag_threshold: u16,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            source_url: DEFAULT_SOURCE_URL.to_string(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            finish_delay_ms: DEFAULT_FINISH_DELAY_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            save_dir: None,
            open_links: false,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
        }
    }
}

impl UserConfig {
    /// Get the config file path (~/.config/catswp/config.json)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("catswp").join("config.json"))
    }

    /// Load config from the default location, or defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path().ok_or_else(|| {
            CatswpError::ConfigError("Could not determine config directory".to_string())
        })?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            CatswpError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            CatswpError::ConfigError(format!("Failed to parse config file: {}", e))
        })
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path().ok_or_else(|| {
            CatswpError::ConfigError("Could not determine config directory".to_string())
        })?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CatswpError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            CatswpError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, contents).map_err(|e| {
            CatswpError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }
}
