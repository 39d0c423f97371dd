//! Centralized path utilities
//!
//! All application paths in one place for consistency

use std::path::PathBuf;

use crate::constants::ui;

/// Get the devpilot config directory (~/.devpilot)
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(ui::CONFIG_DIR_NAME)
}

/// Get the default config file (~/.devpilot/config.toml)
pub fn config_path() -> PathBuf {
    config_dir().join(ui::CONFIG_FILE_NAME)
}

/// Get the logs directory (~/.devpilot/logs)
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Get the exports directory (~/.devpilot/exports)
/// Used when an export is requested without an explicit output path
pub fn exports_dir() -> PathBuf {
    config_dir().join("exports")
}

/// Ensure the exports directory exists, creating it if necessary
pub fn ensure_exports_dir() -> std::io::Result<PathBuf> {
    let dir = exports_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
