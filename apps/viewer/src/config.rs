use std::{collections::HashMap, fs, path::Path, time::Duration};

use catalog_core::DEFAULT_API_BASE_URL;
use shared::domain::LISTING_CAP;

pub const CONFIG_FILE: &str = "catalog.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub listing_limit: u32,
    /// Zero disables the per-request timeout.
    pub request_timeout_secs: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            listing_limit: LISTING_CAP,
            request_timeout_secs: 30,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the config file (if readable), then environment variables.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, env);

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        return;
    };
    let get = |key: &str| file_cfg.get(key).and_then(value_text);

    if let Some(v) = get("api_base_url") {
        settings.api_base_url = v;
    }
    if let Some(v) = get("listing_limit").and_then(|v| v.parse().ok()) {
        settings.listing_limit = v;
    }
    if let Some(v) = get("request_timeout_secs").and_then(|v| v.parse().ok()) {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = get("log_filter") {
        settings.log_filter = v;
    }
}

fn value_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(text) => Some(text.clone()),
        toml::Value::Integer(number) => Some(number.to_string()),
        _ => None,
    }
}

fn apply_env(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("CATALOG_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    for key in ["CATALOG_LISTING_LIMIT", "APP__LISTING_LIMIT"] {
        if let Some(parsed) = env(key).and_then(|v| v.trim().parse::<u32>().ok()) {
            settings.listing_limit = parsed;
        }
    }

    if let Some(parsed) = env("APP__REQUEST_TIMEOUT_SECS").and_then(|v| v.trim().parse::<u64>().ok())
    {
        settings.request_timeout_secs = parsed;
    }

    if let Some(v) = env("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
