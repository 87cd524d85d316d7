//! Client configuration resolved from the environment.

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const SERVER_URL_KEY: &str = "AVUKAT_SERVER_URL";
pub const REQUEST_TIMEOUT_KEY: &str = "AVUKAT_REQUEST_TIMEOUT_SECS";
pub const UPLOAD_LIMIT_KEY: &str = "AVUKAT_UPLOAD_LIMIT_BYTES";

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_UPLOAD_LIMIT_BYTES: u64 = 25 * 1024 * 1024;

/// Connection settings for the case API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: Url,
    pub request_timeout: Duration,
    pub upload_limit_bytes: u64,
}

impl ClientConfig {
    /// Resolve configuration from the environment. An explicit server URL
    /// (e.g. from a CLI flag) takes precedence over `AVUKAT_SERVER_URL`.
    pub fn from_env(server_url_override: Option<&str>) -> Result<Self, ConfigError> {
        let raw_url = match server_url_override {
            Some(url) => url.to_string(),
            None => env::var(SERVER_URL_KEY).unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string()),
        };
        Self::resolve(
            &raw_url,
            env::var(REQUEST_TIMEOUT_KEY).ok().as_deref(),
            env::var(UPLOAD_LIMIT_KEY).ok().as_deref(),
        )
    }

    /// Build a validated configuration from raw values.
    pub fn resolve(
        raw_url: &str,
        raw_timeout: Option<&str>,
        raw_upload_limit: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let server_url = validate_server_url(raw_url)?;

        let request_timeout = match raw_timeout {
            Some(raw) => Duration::from_secs(parse_positive_u64(REQUEST_TIMEOUT_KEY, raw)?),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let upload_limit_bytes = match raw_upload_limit {
            Some(raw) => parse_positive_u64(UPLOAD_LIMIT_KEY, raw)?,
            None => DEFAULT_UPLOAD_LIMIT_BYTES,
        };

        Ok(Self {
            server_url,
            request_timeout,
            upload_limit_bytes,
        })
    }

    /// Base URL without a trailing slash, ready for endpoint formatting.
    pub fn base_url(&self) -> String {
        self.server_url.as_str().trim_end_matches('/').to_string()
    }
}

fn validate_server_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: SERVER_URL_KEY.to_string(),
            message: "server URL must not be empty".to_string(),
        });
    }

    let url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidValue {
        key: SERVER_URL_KEY.to_string(),
        message: format!("unparseable URL: {e}"),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ConfigError::InvalidValue {
                key: SERVER_URL_KEY.to_string(),
                message: format!("unsupported scheme '{other}' (expected http or https)"),
            });
        }
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidValue {
            key: SERVER_URL_KEY.to_string(),
            message: "server URL must include a host".to_string(),
        });
    }

    Ok(url)
}

fn parse_positive_u64(key: &str, raw: &str) -> Result<u64, ConfigError> {
    let value: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected a positive integer, got '{}'", raw.trim()),
    })?;
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "value must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
