use std::{collections::HashMap, fs, path::Path, time::Duration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub token: Option<String>,
    pub request_timeout_secs: u64,
    pub event_buffer: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api/v1".into(),
            token: None,
            request_timeout_secs: 30,
            event_buffer: 256,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new("feed.toml"), |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file if present, then environment variables.
pub fn load_settings_from(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("api_base_url").and_then(|v| v.as_str()) {
                    settings.api_base_url = v.to_string();
                }
                if let Some(v) = file_cfg.get("token").and_then(|v| v.as_str()) {
                    settings.token = Some(v.to_string());
                }
                if let Some(v) = file_cfg
                    .get("request_timeout_secs")
                    .and_then(|v| v.as_integer())
                    .and_then(|v| u64::try_from(v).ok())
                {
                    settings.request_timeout_secs = v;
                }
                if let Some(v) = file_cfg
                    .get("event_buffer")
                    .and_then(|v| v.as_integer())
                    .and_then(|v| usize::try_from(v).ok())
                {
                    settings.event_buffer = v;
                }
            }
            Err(err) => {
                tracing::warn!(
                    path = %config_path.display(),
                    "ignoring unreadable settings file: {err}"
                );
            }
        }
    }

    if let Some(v) = env("FEED_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("FEED_TOKEN") {
        settings.token = Some(v);
    }
    if let Some(v) = env("APP__TOKEN") {
        settings.token = Some(v);
    }

    for key in ["FEED_REQUEST_TIMEOUT_SECS", "APP__REQUEST_TIMEOUT_SECS"] {
        if let Some(v) = env(key).and_then(|v| v.trim().parse::<u64>().ok()) {
            settings.request_timeout_secs = v;
        }
    }
    for key in ["FEED_EVENT_BUFFER", "APP__EVENT_BUFFER"] {
        if let Some(v) = env(key).and_then(|v| v.trim().parse::<usize>().ok()) {
            settings.event_buffer = v;
        }
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
