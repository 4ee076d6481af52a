//! Configuration management for Tusach

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::theme::Theme;

const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Selected theme name
    pub theme: String,

    /// Custom theme overrides (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_theme: Option<Theme>,

    /// hjkl navigation on the shelf and in the reader
    pub vim_mode: bool,

    /// Largest book accepted, in MiB; `null` removes the cap
    pub max_book_mib: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "Tokyo Night".to_string(),
            custom_theme: None,
            vim_mode: true,
            max_book_mib: Some(64),
        }
    }
}

impl Config {
    /// Load configuration from disk, or create default if not exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it is missing.
    ///
    /// A file that does not parse yields the defaults and is not overwritten.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            Ok(serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Ignoring malformed config {:?}, using defaults: {}", path, e);
                Self::default()
            }))
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "tusach").context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Get the data directory path, unless `overridden`
    pub fn data_dir(overridden: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = overridden {
            return Ok(dir.to_path_buf());
        }
        let proj_dirs =
            ProjectDirs::from("", "", "tusach").context("Failed to determine data directory")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Payload cap in bytes
    pub fn max_book_bytes(&self) -> Option<usize> {
        self.max_book_mib
            .map(|mib| usize::try_from(mib.saturating_mul(BYTES_PER_MIB)).unwrap_or(usize::MAX))
    }

    /// Get the active theme
    pub fn active_theme(&self) -> Theme {
        self.custom_theme.clone().unwrap_or_else(|| Theme::by_name(&self.theme))
    }
}
