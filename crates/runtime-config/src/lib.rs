//! Client configuration types.
//!
//! The CLI reads and writes `biasbuster.toml` using these types. Loading
//! and saving live in the CLI crate; this crate only knows the shape and
//! the defaults.

use std::path::PathBuf;

use biasbuster_core::Model;
use serde::{Deserialize, Serialize};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "biasbuster.toml";

/// Environment variable that overrides `server.url`.
pub const BASE_URL_ENV: &str = "BIASBUSTER_API_BASE_URL";

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Top-level client configuration (persisted as `biasbuster.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Wire identifier of the model selected at start-up.
    #[serde(default = "default_model")]
    pub default_model: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            default_model: default_model(),
        }
    }
}

impl ChatSettings {
    /// Parsed model, falling back to the default for unknown identifiers.
    pub fn model(&self) -> Model {
        self.default_model.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExportSettings {
    /// Directory exported reports are written to; the working directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub default_format: ExportFormatSetting,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormatSetting {
    #[default]
    Pdf,
    Json,
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_model() -> String {
    Model::default().as_str().to_string()
}

/// Apply compatibility fallbacks after loading raw TOML.
/// Returns true when any field was updated.
pub fn apply_compat_fallbacks(config: &mut ClientConfig) -> bool {
    let mut changed = false;

    if config.chat.default_model.parse::<Model>().is_err() {
        config.chat.default_model = default_model();
        changed = true;
    }

    let trimmed = config.server.url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        config.server.url = default_server_url();
        changed = true;
    } else if trimmed != config.server.url {
        config.server.url = trimmed.to_string();
        changed = true;
    }

    if config.server.timeout_secs == 0 {
        config.server.timeout_secs = default_timeout_secs();
        changed = true;
    }

    changed
}

/// Apply environment overrides through `lookup` (normally `std::env::var`).
pub fn apply_env_overrides(config: &mut ClientConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(BASE_URL_ENV) {
        let url = url.trim().trim_end_matches('/');
        if !url.is_empty() {
            config.server.url = url.to_string();
        }
    }
}
