use anyhow::{Context, Result};
use biasbuster_core::Model;
use biasbuster_runtime_config::{
    ClientConfig, ExportFormatSetting, apply_compat_fallbacks, apply_env_overrides,
};
use std::path::{Path, PathBuf};

/// Canonical config file path.
pub fn config_path() -> Result<PathBuf> {
    biasbuster_paths::config_file().context("Could not locate config directory")
}

fn read_config_file(path: &Path) -> Result<ClientConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let config = match toml::from_str::<ClientConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %path.display(), "ignoring unparsable config: {err}");
            ClientConfig::default()
        }
    };
    Ok(config)
}

/// Config as stored on disk, with defaults filled in.
pub fn load_stored_config() -> Result<ClientConfig> {
    let path = config_path()?;
    let mut config = if path.exists() {
        read_config_file(&path)?
    } else {
        ClientConfig::default()
    };
    apply_compat_fallbacks(&mut config);
    Ok(config)
}

/// Effective config: stored values plus environment overrides.
pub fn load_config() -> Result<ClientConfig> {
    let mut config = load_stored_config()?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Save config to disk (in `biasbuster.toml`).
pub fn save_config(config: &ClientConfig) -> Result<()> {
    let path = config_path()?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config dir at {}", dir.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config at {}", path.display()))?;
    Ok(())
}

/// Directory exported reports land in.
pub fn export_dir(config: &ClientConfig) -> PathBuf {
    config
        .export
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Print current config.
pub fn show_config() -> Result<()> {
    let config = load_config()?;
    let path = config_path()?;
    println!("Config file: {}", path.display());
    println!();
    println!("[server]");
    println!("  url          = {}", config.server.url);
    println!("  timeout_secs = {}", config.server.timeout_secs);
    println!();
    println!("[chat]");
    println!("  default_model = {}", config.chat.model());
    println!();
    println!("[export]");
    println!(
        "  output_dir     = {}",
        config
            .export
            .output_dir
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(current directory)".to_string())
    );
    println!(
        "  default_format = {}",
        match config.export.default_format {
            ExportFormatSetting::Pdf => "pdf",
            ExportFormatSetting::Json => "json",
        }
    );
    Ok(())
}

/// Update config with provided values.
pub fn set_config(
    server_url: Option<String>,
    model: Option<Model>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_stored_config()?;

    if let Some(url) = server_url {
        config.server.url = url;
    }
    if let Some(model) = model {
        config.chat.default_model = model.as_str().to_string();
    }
    if let Some(dir) = output_dir {
        config.export.output_dir = Some(dir);
    }
    apply_compat_fallbacks(&mut config);

    save_config(&config)?;
    println!("Configuration updated.");
    show_config()?;
    Ok(())
}
