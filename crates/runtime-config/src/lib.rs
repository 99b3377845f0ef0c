//! Shared runtime configuration types.
//!
//! The CLI reads and writes `cosmicface.toml` using these types; every section
//! is optional and falls back to defaults, so a partial file is always valid.

use serde::{Deserialize, Serialize};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "cosmicface.toml";

/// Top-level configuration (persisted as `cosmicface.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CosmicConfig {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub identity: IdentitySettings,
    #[serde(default)]
    pub history: HistorySettings,
    #[serde(default)]
    pub carousel: CarouselSettings,
}

/// Managed-function backend (primary analysis path, history, save).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default = "default_functions_url")]
    pub functions_url: String,
    /// Bound on each backend attempt, including the history save.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            functions_url: default_functions_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Direct model access (secondary analysis path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
            api_url: default_gemini_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IdentitySettings {
    /// Readings are only saved to history when this is set.
    #[serde(default)]
    pub user_id: String,
}

impl IdentitySettings {
    pub fn user_id(&self) -> Option<&str> {
        Some(self.user_id.trim()).filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySettings {
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            limit: default_history_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselSettings {
    /// Duration of the eased transition after a node click.
    #[serde(default = "default_snap_duration_ms")]
    pub snap_duration_ms: u64,
}

impl Default for CarouselSettings {
    fn default() -> Self {
        Self {
            snap_duration_ms: default_snap_duration_ms(),
        }
    }
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_functions_url() -> String {
    "http://127.0.0.1:5001/cosmicface/us-central1".to_string()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_history_limit() -> usize {
    50
}
fn default_snap_duration_ms() -> u64 {
    300
}

/// Environment variables consulted by [`apply_env_overrides`].
pub const ENV_GEMINI_API_KEY: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];
pub const ENV_FUNCTIONS_URL: &str = "COSMICFACE_FUNCTIONS_URL";
pub const ENV_GEMINI_MODEL: &str = "COSMICFACE_GEMINI_MODEL";
pub const ENV_USER_ID: &str = "COSMICFACE_USER_ID";

/// Overlay environment values onto a loaded config.
///
/// `lookup` is usually `|name| std::env::var(name).ok()`. Blank values are
/// ignored. Returns true when any field was updated.
pub fn apply_env_overrides(config: &mut CosmicConfig, lookup: impl Fn(&str) -> Option<String>) -> bool {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let mut changed = false;

    if config.gemini.api_key.trim().is_empty() {
        if let Some(key) = ENV_GEMINI_API_KEY.iter().find_map(|name| get(name)) {
            config.gemini.api_key = key;
            changed = true;
        }
    }

    if let Some(url) = get(ENV_FUNCTIONS_URL) {
        config.backend.functions_url = url;
        changed = true;
    }

    if let Some(model) = get(ENV_GEMINI_MODEL) {
        config.gemini.model = model;
        changed = true;
    }

    if let Some(user_id) = get(ENV_USER_ID) {
        config.identity.user_id = user_id;
        changed = true;
    }

    changed
}
