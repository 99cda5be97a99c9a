//! TOML-based application configuration.
//!
//! Stores host-app preferences the engine itself does not interpret:
//! - The active child profile for the CLI
//! - Celebration/reminder toggles
//!
//! Configuration is stored at `~/.config/madrasah/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use super::data_dir;
use crate::error::{ConfigError, Result};

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub celebrations_enabled: bool,
    #[serde(default = "default_true")]
    pub streak_reminder_enabled: bool,
    /// Local hour (0-23) at which a streak reminder fires.
    #[serde(default = "default_reminder_hour")]
    pub streak_reminder_hour: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/madrasah/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Child profile the CLI operates on when `--child` is not given.
    #[serde(default)]
    pub active_child: Option<Uuid>,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

fn default_true() -> bool {
    true
}
fn default_reminder_hour() -> u32 {
    17
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            celebrations_enabled: true,
            streak_reminder_enabled: true,
            streak_reminder_hour: default_reminder_hour(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file does
    /// not exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Ok(config)
    }

    /// Persist the configuration.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}
