//! Client configuration parsed from environment variables.

use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const SESSION_FILE_NAME: &str = "session.json";

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
    /// Versioned API base, without a trailing slash.
    pub api_base_url: String,
    pub timeouts: Timeouts,
    /// JSON file standing in for browser local storage.
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `THREATSCOPE_API_URL`: default `http://localhost:8000/api/v1`
    /// - `THREATSCOPE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `THREATSCOPE_CONNECT_TIMEOUT_SECS`: default 10
    /// - `THREATSCOPE_SESSION_FILE`: default `<config dir>/threatscope/session.json`
    ///
    /// # Errors
    ///
    /// Returns an error if a timeout is not a positive integer or no session
    /// file location can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = normalize_base_url(
            &std::env::var("THREATSCOPE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        )?;
        let timeouts = Timeouts {
            request_secs: env_parse_secs("THREATSCOPE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_secs("THREATSCOPE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };
        let session_file = match std::env::var("THREATSCOPE_SESSION_FILE") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_session_file()?,
        };

        Ok(Self { api_base_url, timeouts, session_file })
    }

    /// Config pointing at `api_base_url` with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not http(s).
    pub fn new(api_base_url: &str, session_file: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: normalize_base_url(api_base_url)?,
            timeouts: Timeouts::default(),
            session_file: session_file.into(),
        })
    }
}

/// Trim whitespace and trailing slashes; require an http(s) scheme.
///
/// # Errors
///
/// Returns an error for an empty or non-http(s) URL.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::Parse(format!("invalid THREATSCOPE_API_URL: {raw:?}")));
    }
    Ok(trimmed.to_string())
}

fn env_parse_secs(key: &str, default: u64) -> Result<u64, ConfigError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(ConfigError::Parse(format!("{key} must be a positive integer, got {raw:?}"))),
        Ok(secs) => Ok(secs),
    }
}

fn default_session_file() -> Result<PathBuf, ConfigError> {
    let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(dir.join("threatscope").join(SESSION_FILE_NAME))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
