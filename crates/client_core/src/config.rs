use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use shared::protocol::DEFAULT_SEARCH_ENDPOINT;
use url::Url;

pub const SETTINGS_FILE: &str = "face_search.toml";
pub const ENDPOINT_ENV: &str = "FACE_SEARCH_ENDPOINT";
pub const TIMEOUT_ENV: &str = "FACE_SEARCH_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub endpoint: String,
    /// `None` waits for the service indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.into(),
            request_timeout: None,
        }
    }
}

impl ClientSettings {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        if !endpoint.trim().is_empty() {
            self.endpoint = endpoint.trim().to_string();
        }
        self
    }

    /// A zero timeout disables the limit.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    pub fn validate(&self) -> anyhow::Result<Url> {
        let url = Url::parse(&self.endpoint)
            .with_context(|| format!("invalid search endpoint '{}'", self.endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!(
                "search endpoint '{}' must use http or https, got '{}'",
                self.endpoint,
                url.scheme()
            );
        }
        Ok(url)
    }
}

/// Defaults, then `face_search.toml` in the working directory, then the
/// process environment.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<toml::Table>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("endpoint").and_then(|v| v.as_str()) {
                    settings = settings.with_endpoint(v);
                }
                if let Some(v) = file_cfg.get("timeout_secs").and_then(|v| v.as_integer()) {
                    if let Ok(secs) = u64::try_from(v) {
                        settings = settings.with_timeout_secs(secs);
                    }
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "ignoring unreadable settings file: {err}");
            }
        }
    }

    if let Some(v) = env(ENDPOINT_ENV) {
        settings = settings.with_endpoint(v);
    }
    if let Some(v) = env(TIMEOUT_ENV) {
        if let Ok(secs) = v.trim().parse::<u64>() {
            settings = settings.with_timeout_secs(secs);
        }
    }

    settings
}
