use anyhow::{Context, Result};
use cosmicface_runtime_config::{CONFIG_FILE_NAME, CosmicConfig, apply_env_overrides};
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/cosmicface/)
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("cosmicface"))
}

/// Canonical config file path.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Read the config file as written, without environment overrides.
/// A missing file yields the defaults.
pub fn read_config(path: &Path) -> Result<CosmicConfig> {
    if !path.exists() {
        return Ok(CosmicConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config at {}", path.display()))
}

pub fn write_config(path: &Path, config: &CosmicConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config at {}", path.display()))?;
    Ok(())
}

/// Effective config: the file plus environment overrides.
pub fn load_config() -> Result<CosmicConfig> {
    let mut config = read_config(&config_path()?)?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

fn mask_secret(secret: &str) -> String {
    if secret.trim().is_empty() {
        return "(not set)".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}...")
}

pub fn show_config() -> Result<()> {
    let path = config_path()?;
    let config = load_config()?;

    println!("Config file: {}", path.display());
    println!();
    println!("[backend]");
    println!("  functions_url = {}", config.backend.functions_url);
    println!("  timeout_secs  = {}", config.backend.timeout_secs);
    println!();
    println!("[gemini]");
    println!("  model   = {}", config.gemini.model);
    println!("  api_key = {}", mask_secret(&config.gemini.api_key));
    println!();
    println!("[identity]");
    println!(
        "  user_id = {}",
        config.identity.user_id().unwrap_or("(anonymous)")
    );
    Ok(())
}

pub fn set_config(
    functions_url: Option<String>,
    gemini_api_key: Option<String>,
    user_id: Option<String>,
) -> Result<()> {
    let path = config_path()?;
    let mut config = read_config(&path)?;
    apply_updates(&mut config, functions_url, gemini_api_key, user_id);
    write_config(&path, &config)?;
    println!("Configuration updated.");
    Ok(())
}

fn apply_updates(
    config: &mut CosmicConfig,
    functions_url: Option<String>,
    gemini_api_key: Option<String>,
    user_id: Option<String>,
) {
    if let Some(url) = functions_url {
        config.backend.functions_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(key) = gemini_api_key {
        config.gemini.api_key = key.trim().to_string();
    }
    if let Some(id) = user_id {
        config.identity.user_id = id.trim().to_string();
    }
}
