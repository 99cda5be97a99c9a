mod config;
pub mod store;

pub use config::Config;
pub use store::ProgressStore;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns `~/.config/madrasah[-dev]/` based on MADRASAH_ENV.
///
/// Set MADRASAH_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MADRASAH_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("madrasah-dev")
    } else {
        base_dir.join("madrasah")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
