// src/db/paths.rs
//! Centralized path derivation for Supercash files

use std::path::{Path, PathBuf};

/// Application directory name under the platform data/config roots
const APP_DIR: &str = "supercash";

/// Default location of the embedded database
///
/// `<data_dir>/supercash/supercash.db`, falling back to the working
/// directory when the platform has no data directory.
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("supercash.db")
}

/// Default location of the user configuration file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Get the directory containing the database
pub fn db_dir(db_path: &Path) -> PathBuf {
    db_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf()
}
