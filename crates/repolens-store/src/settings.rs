use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Env var overriding `api_base_url`.
pub const API_BASE_URL_ENV: &str = "REPOLENS_API_BASE_URL";

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Client settings, stored in `store_root/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub poll_interval_secs: u64,
    pub max_attempts: u32,
    pub phase_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_interval_secs: 2,
            max_attempts: 60,
            phase_interval_secs: 8,
            request_timeout_secs: 10,
        }
    }
}

impl Settings {
    /// Load from a config file. Returns defaults if the file is missing or
    /// unparseable; individual missing keys take their default.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str::<Settings>(&content) {
            Ok(s) => s.normalized(),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "ignoring unparseable config");
                Self::default()
            }
        }
    }

    /// Settings from `store_root/config.json` with env overrides applied.
    pub fn load_default() -> Self {
        let mut settings = Self::load(&crate::config_path());
        if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
            if !url.trim().is_empty() {
                settings.api_base_url = url.trim().to_string();
            }
        }
        settings
    }

    /// Clamp values that would stall polling.
    pub fn normalized(mut self) -> Self {
        self.poll_interval_secs = self.poll_interval_secs.max(1);
        self.max_attempts = self.max_attempts.max(1);
        self.phase_interval_secs = self.phase_interval_secs.max(1);
        self.request_timeout_secs = self.request_timeout_secs.max(1);
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self
    }
}

// ── Raw config map (for `repolens config`) ──

/// Read the config file as a JSON map. Returns empty map if it doesn't exist.
pub fn read_config_map(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let content = std::fs::read_to_string(path)?;
    let val: Value = serde_json::from_str(&content)?;
    match val {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Write the config map atomically.
pub fn write_config_map(path: &Path, config: &Map<String, Value>) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    crate::write_atomic(path, json.as_bytes())
}
