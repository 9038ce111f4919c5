//! Shared configuration types.
//!
//! The CLI and any embedding front end read/write `opchecklist.toml` using
//! these types. Path resolution lives in `opchecklist-paths`.

use serde::{Deserialize, Serialize};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "opchecklist.toml";

/// Top-level configuration (persisted as `opchecklist.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub view: ViewSettings,
    #[serde(default)]
    pub realtime: RealtimeSettings,
    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ViewSettings {
    /// Event whose checklists are listed by default.
    #[serde(default)]
    pub event_id: String,
    /// Operational period treated as "current"; empty means none.
    #[serde(default)]
    pub current_operational_period_id: String,
    #[serde(default = "default_false")]
    pub include_archived: bool,
}

impl ViewSettings {
    pub fn current_period(&self) -> Option<&str> {
        let trimmed = self.current_operational_period_id.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// How many recent checklist ids are remembered to drop duplicate deliveries.
    #[serde(default = "default_recent_event_window")]
    pub recent_event_window: usize,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            recent_event_window: default_recent_event_window(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    /// Delay in seconds before each retry.
    #[serde(default = "default_retry_delays")]
    pub delays: Vec<u64>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delays: default_retry_delays(),
        }
    }
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_recent_event_window() -> usize {
    256
}
fn default_max_retries() -> usize {
    2
}
fn default_retry_delays() -> Vec<u64> {
    vec![1, 2]
}

/// Upper bound on `retry.max_retries` accepted from the config file.
pub const MAX_RETRIES: usize = 10;

/// Repair values that would leave the view unusable after loading raw TOML.
/// Returns true when any field was updated.
pub fn apply_compat_fallbacks(config: &mut AppConfig) -> bool {
    let mut changed = false;

    if config.server.url.trim().is_empty() {
        config.server.url = default_server_url();
        changed = true;
    }

    if config.server.timeout_secs == 0 {
        config.server.timeout_secs = default_timeout_secs();
        changed = true;
    }

    if config.realtime.recent_event_window == 0 {
        config.realtime.recent_event_window = default_recent_event_window();
        changed = true;
    }

    if config.retry.max_retries > MAX_RETRIES {
        config.retry.max_retries = MAX_RETRIES;
        changed = true;
    }

    if config.retry.delays.len() < config.retry.max_retries {
        let last = config.retry.delays.last().copied().unwrap_or(1);
        config.retry.delays.resize(config.retry.max_retries, last);
        changed = true;
    }

    changed
}
