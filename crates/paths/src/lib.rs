//! Where the client keeps its files.
//!
//! Everything lives in one per-user config directory: the TOML config and
//! the session token file beside it.

use std::path::PathBuf;

use biasbuster_runtime_config::CONFIG_FILE_NAME;

/// File holding the durable session token.
pub const SESSION_FILE_NAME: &str = "session.toml";

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("could not determine a home directory for the current user")]
    NoHome,
}

pub type Result<T> = std::result::Result<T, PathError>;

/// Per-user config directory (e.g. `~/.config/biasbuster` on Linux).
pub fn config_dir() -> Result<PathBuf> {
    directories::ProjectDirs::from("io", "biasbuster", "biasbuster")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(PathError::NoHome)
}

pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

pub fn session_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(SESSION_FILE_NAME))
}
