use anyhow::{Context, Result, bail};
use opchecklist_api_client::{ApiClient, RetryConfig};
use opchecklist_local_store::FileStore;
use opchecklist_runtime_config::{AppConfig, apply_compat_fallbacks};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Load config from the canonical path, returning defaults if not found.
pub fn load_config() -> Result<AppConfig> {
    let path = opchecklist_paths::config_path()?;
    load_config_from(&path)
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    let path = opchecklist_paths::config_path()?;
    save_config_to(&path, config)
}

/// Unparseable files fall back to defaults with a warning; unreadable ones
/// are an error.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let mut config = match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("ignoring invalid config at {}: {e}", path.display());
            AppConfig::default()
        }
    };
    apply_compat_fallbacks(&mut config);
    Ok(config)
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config dir at {}", dir.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config at {}", path.display()))?;
    Ok(())
}

/// Resolve the event id from a flag or the configured default.
pub fn resolve_event_id(flag: Option<String>, config: &AppConfig) -> Result<String> {
    let event_id = flag.unwrap_or_else(|| config.view.event_id.clone());
    let event_id = event_id.trim();
    if event_id.is_empty() {
        bail!("No event selected. Pass --event or run: opchecklist config --event <id>");
    }
    Ok(event_id.to_string())
}

pub fn api_client(config: &AppConfig) -> Result<ApiClient> {
    let mut client = ApiClient::new(
        &config.server.url,
        Duration::from_secs(config.server.timeout_secs),
    )?;
    if !config.server.api_key.is_empty() {
        client.set_auth(config.server.api_key.clone());
    }
    client.set_retry(RetryConfig {
        max_retries: config.retry.max_retries,
        delays: config.retry.delays.clone(),
    });
    Ok(client)
}

pub fn show_config() -> Result<()> {
    let config = load_config()?;
    let path = opchecklist_paths::config_path()?;
    println!("Config: {}", path.display());
    println!("  server:  {}", config.server.url);
    println!(
        "  api_key: {}",
        if config.server.api_key.is_empty() {
            "(not set)".to_string()
        } else {
            mask_key(&config.server.api_key)
        }
    );
    println!(
        "  event:   {}",
        if config.view.event_id.is_empty() {
            "(not set)"
        } else {
            &config.view.event_id
        }
    );
    if let Some(period) = config.view.current_period() {
        println!("  current period: {period}");
    }
    let store = FileStore::open()?;
    println!("Store: {}", store.root().display());
    Ok(())
}

pub fn set_config(
    server: Option<String>,
    api_key: Option<String>,
    event: Option<String>,
) -> Result<()> {
    let mut config = load_config()?;
    if let Some(url) = server {
        config.server.url = url;
    }
    if let Some(key) = api_key {
        config.server.api_key = key;
    }
    if let Some(event) = event {
        config.view.event_id = event.trim().to_string();
    }
    save_config(&config)?;
    println!("Configuration saved.");
    show_config()
}

fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{visible}…")
}
