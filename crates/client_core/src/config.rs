use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use shared::protocol::DEFAULT_SOUND_SET;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "nui.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeSettings {
    pub resource_name: String,
    pub endpoint: Option<String>,
    pub default_sound_set: String,
    pub request_timeout_secs: Option<u64>,
    pub log_filter: String,
    pub notification_duration_ms: u64,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            resource_name: "tournament-ui".into(),
            endpoint: None,
            default_sound_set: DEFAULT_SOUND_SET.into(),
            request_timeout_secs: Some(30),
            log_filter: "info".into(),
            notification_duration_ms: 5000,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    resource_name: Option<String>,
    endpoint: Option<String>,
    default_sound_set: Option<String>,
    request_timeout_secs: Option<u64>,
    log_filter: Option<String>,
    notification_duration_ms: Option<u64>,
}

/// Accessor for the identity of the hosting resource.
pub trait ResourceIdentity {
    fn resource_name(&self) -> String;
}

impl ResourceIdentity for BridgeSettings {
    fn resource_name(&self) -> String {
        self.resource_name.clone()
    }
}

impl BridgeSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_duration_ms)
    }

    /// Overlays `KEY` / `value` pairs using the documented variable names.
    pub fn apply_env<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            let value = value.into();
            match key.as_ref() {
                "NUI_RESOURCE_NAME" | "APP__RESOURCE_NAME" => self.resource_name = value,
                "APP__ENDPOINT" => self.endpoint = Some(value),
                "APP__DEFAULT_SOUND_SET" => self.default_sound_set = value,
                "APP__REQUEST_TIMEOUT_SECS" => {
                    if let Ok(parsed) = value.parse::<u64>() {
                        self.request_timeout_secs = Some(parsed);
                    }
                }
                "APP__LOG_FILTER" => self.log_filter = value,
                "APP__NOTIFICATION_DURATION_MS" => {
                    if let Ok(parsed) = value.parse::<u64>() {
                        self.notification_duration_ms = parsed;
                    }
                }
                _ => {}
            }
        }
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.resource_name {
            self.resource_name = v;
        }
        if let Some(v) = file.endpoint {
            self.endpoint = Some(v);
        }
        if let Some(v) = file.default_sound_set {
            self.default_sound_set = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout_secs = Some(v);
        }
        if let Some(v) = file.log_filter {
            self.log_filter = v;
        }
        if let Some(v) = file.notification_duration_ms {
            self.notification_duration_ms = v;
        }
    }
}

/// Defaults, then the TOML file when it exists, then the process environment.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<BridgeSettings> {
    let mut settings = BridgeSettings::default();
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_SETTINGS_FILE));

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let file: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
        settings.apply_file(file);
    }

    settings.apply_env(std::env::vars());
    Ok(settings)
}

/// Resolves the outbound base URL once: explicit override, else the
/// resource's own `https://<name>/` origin.
pub fn resolve_endpoint(
    identity: &dyn ResourceIdentity,
    endpoint_override: Option<&str>,
) -> anyhow::Result<Url> {
    let raw = match endpoint_override {
        Some(endpoint) if !endpoint.trim().is_empty() => endpoint.trim().to_string(),
        _ => {
            let name = identity.resource_name();
            let name = name.trim();
            anyhow::ensure!(!name.is_empty(), "resource name must not be empty");
            format!("https://{name}/")
        }
    };
    Url::parse(&raw).with_context(|| format!("invalid host endpoint '{raw}'"))
}
