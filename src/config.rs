//! Client configuration parsed from environment variables.

use std::time::Duration;

pub const API_URL_ENV: &str = "STOCKROOM_API_URL";
pub const DEFAULT_API_URL: &str = "https://backend-uoee.onrender.com/api";
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors produced while resolving client configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The base URL is not an absolute http(s) URL.
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request: Duration,
    pub connect: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            connect: Duration::from_secs(CONNECT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build config from the environment.
    ///
    /// Optional:
    /// - `STOCKROOM_API_URL`: remote API base URL (default [`DEFAULT_API_URL`])
    ///
    /// Timeouts are fixed and not read from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(API_URL_ENV) {
            Ok(raw) if !raw.trim().is_empty() => Self::with_base_url(&raw),
            _ => Self::with_base_url(DEFAULT_API_URL),
        }
    }

    /// Build config from an optional `--base-url` flag.
    ///
    /// A missing or blank flag falls back to [`ClientConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the chosen URL does not parse.
    pub fn resolve(flag: Option<&str>) -> Result<Self, ConfigError> {
        match flag {
            Some(raw) if !raw.trim().is_empty() => Self::with_base_url(raw),
            _ => Self::from_env(),
        }
    }

    /// Build config for an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL does not parse.
    pub fn with_base_url(raw: &str) -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(raw)?;
        Ok(Self { base_url, timeouts: Timeouts::default() })
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed).map_err(|_| ConfigError::InvalidBaseUrl(raw.to_owned()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
