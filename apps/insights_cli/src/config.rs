use std::{fs, path::Path, time::Duration};

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;
use url::Url;

pub const CONFIG_FILE: &str = "insights.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint_url: Option<String>,
    pub request_timeout_secs: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            request_timeout_secs: client_core::transport::DEFAULT_REQUEST_TIMEOUT.as_secs(),
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    endpoint_url: Option<String>,
    request_timeout_secs: Option<u64>,
    log_filter: Option<String>,
}

impl Settings {
    pub fn endpoint(&self) -> anyhow::Result<Url> {
        let raw = self
            .endpoint_url
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "no endpoint configured; pass --endpoint, set INSIGHTS_ENDPOINT_URL, or add endpoint_url to {CONFIG_FILE}"
                )
            })?;
        let url = Url::parse(raw).with_context(|| format!("invalid endpoint url '{raw}'"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("endpoint url '{raw}' must use http or https");
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file if readable, then environment overrides.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.endpoint_url {
                    settings.endpoint_url = Some(v);
                }
                if let Some(v) = file_cfg.request_timeout_secs {
                    settings.request_timeout_secs = v;
                }
                if let Some(v) = file_cfg.log_filter {
                    settings.log_filter = v;
                }
            }
            Err(error) => {
                eprintln!("ignoring unreadable {}: {error}", path.display());
            }
        }
    }

    if let Some(v) = env("INSIGHTS_ENDPOINT_URL") {
        settings.endpoint_url = Some(v);
    }
    if let Some(v) = env("APP__ENDPOINT_URL") {
        settings.endpoint_url = Some(v);
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
