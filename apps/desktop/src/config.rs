use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::HttpOptions;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_origin: String,
    pub store_url: String,
    pub accept_invalid_certs: bool,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_origin: "https://127.0.0.1:8000".into(),
            store_url: default_store_url(),
            accept_invalid_certs: false,
            request_timeout_secs: 10,
        }
    }
}

impl Settings {
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            timeout: (self.request_timeout_secs > 0)
                .then(|| Duration::from_secs(self.request_timeout_secs)),
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_origin: Option<String>,
    store_url: Option<String>,
    accept_invalid_certs: Option<bool>,
    request_timeout_secs: Option<u64>,
}

fn default_store_url() -> String {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fighters");
    format!(
        "sqlite://{}",
        dir.join("session.db").to_string_lossy().replace('\\', "/")
    )
}

/// Defaults, then the config file, then `APP__*` environment variables.
///
/// A missing default `client.toml` is fine; a missing file that was asked for
/// explicitly is an error.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound && config_path.is_none() => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_origin {
        settings.api_origin = v;
    }
    if let Some(v) = file_cfg.store_url {
        settings.store_url = v;
    }
    if let Some(v) = file_cfg.accept_invalid_certs {
        settings.accept_invalid_certs = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    Ok(())
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("APP__API_ORIGIN") {
        settings.api_origin = v;
    }
    if let Some(v) = lookup("APP__STORE_URL") {
        settings.store_url = v;
    }
    if let Some(v) = lookup("APP__ACCEPT_INVALID_CERTS") {
        match parse_flag(&v) {
            Some(parsed) => settings.accept_invalid_certs = parsed,
            None => warn!(value = %v, "ignoring invalid APP__ACCEPT_INVALID_CERTS"),
        }
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
