use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::DEFAULT_ROLE;
use url::Url;

pub const SETTINGS_FILE: &str = "luxew-client.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub endpoint_url: String,
    /// Used when the service description does not declare one.
    pub namespace: String,
    pub probe_timeout_secs: u64,
    pub call_timeout_secs: u64,
    pub default_role: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint_url: "http://localhost/luXew/backend/public/soap.php?wsdl".into(),
            namespace: "urn:luxew".into(),
            probe_timeout_secs: 5,
            call_timeout_secs: 10,
            default_role: DEFAULT_ROLE.into(),
        }
    }
}

impl ClientSettings {
    pub fn endpoint(&self) -> anyhow::Result<Url> {
        Url::parse(self.endpoint_url.trim())
            .with_context(|| format!("invalid SOAP endpoint URL '{}'", self.endpoint_url))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

/// File values override the defaults, environment values override the file.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => match toml::from_str::<ClientSettings>(&raw) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(path = %path.display(), "ignoring unreadable settings file: {err}");
                ClientSettings::default()
            }
        },
        Err(_) => ClientSettings::default(),
    };

    if let Some(v) = env("LUXEW_SOAP_URL") {
        settings.endpoint_url = v;
    }
    if let Some(v) = env("APP__SOAP_URL") {
        settings.endpoint_url = v;
    }
    if let Some(v) = env("APP__SOAP_NAMESPACE") {
        settings.namespace = v;
    }
    if let Some(v) = env("APP__PROBE_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.probe_timeout_secs = parsed;
        }
    }
    if let Some(v) = env("APP__CALL_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.call_timeout_secs = parsed;
        }
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
