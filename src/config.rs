//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_HOME_PATH: &str = "/";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid base URL '{0}': expected http:// or https://")]
    InvalidBaseUrl(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL without trailing slash.
    pub base_url: String,
    /// Where invalidated sessions are sent.
    pub login_path: String,
    /// Where signed-in users without the required role are sent.
    pub home_path: String,
    pub timeouts: Timeouts,
    /// File store location; `None` keeps the session in memory only.
    pub storage_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Config with defaults for everything except the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            home_path: DEFAULT_HOME_PATH.to_owned(),
            timeouts: Timeouts::default(),
            storage_path: None,
        })
    }

    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `STOREFRONT_API_URL`
    ///
    /// Optional:
    /// - `STOREFRONT_LOGIN_PATH`: default `/login`
    /// - `STOREFRONT_HOME_PATH`: default `/`
    /// - `STOREFRONT_REQUEST_TIMEOUT_SECS`: default 30
    /// - `STOREFRONT_CONNECT_TIMEOUT_SECS`: default 10
    /// - `STOREFRONT_STORAGE_PATH`: file store location
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is missing or any value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is missing or any value is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("STOREFRONT_API_URL").ok_or(ConfigError::Missing("STOREFRONT_API_URL"))?;
        let mut config = Self::new(&raw_url)?;

        if let Some(path) = lookup("STOREFRONT_LOGIN_PATH") {
            config.login_path = parse_route_path("STOREFRONT_LOGIN_PATH", &path)?;
        }
        if let Some(path) = lookup("STOREFRONT_HOME_PATH") {
            config.home_path = parse_route_path("STOREFRONT_HOME_PATH", &path)?;
        }
        config.timeouts = Timeouts {
            request_secs: parse_secs(&lookup, "STOREFRONT_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_secs(&lookup, "STOREFRONT_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };
        config.storage_path = lookup("STOREFRONT_STORAGE_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    /// Join an API path onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = ["http://", "https://"]
        .iter()
        .any(|scheme| trimmed.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
    if !has_host {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn parse_route_path(key: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('/') {
        return Err(ConfigError::InvalidValue { key, value: raw.to_owned() });
    }
    Ok(trimmed.to_owned())
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::InvalidValue { key, value: raw }),
        },
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
