//! Error taxonomy shared by the session store, API client and forms.
//!
//! DESIGN
//! ======
//! Three failure classes matter to a screen:
//! - `Validation` never reaches the network.
//! - `AuthFailure` has already torn down the session by the time a caller
//!   sees it, so callers never need their own 401 handling.
//! - `Request` is surfaced inline; the user retries by hand.
//!
//! Nothing in this crate retries automatically.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Stable machine-readable code for an error value.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

// =============================================================================
// API
// =============================================================================

/// Errors produced by API client operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Client-side input check failed; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// The server rejected the credential. The session is already cleared.
    #[error("{message}")]
    AuthFailure { message: String },

    /// Network failure or non-success HTTP status other than 401.
    #[error("{message}")]
    Request { status: Option<u16>, message: String },

    /// A success body did not match the expected shape.
    #[error("{endpoint}: unexpected response: {reason}")]
    Decode { endpoint: &'static str, reason: String },

    /// Persisting or removing session tokens failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthFailure { .. } => Some(401),
            Self::Request { status, .. } => *status,
            _ => None,
        }
    }

    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthFailure { .. })
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::AuthFailure { .. } => "E_AUTH_FAILURE",
            Self::Request { status: None, .. } => "E_NETWORK",
            Self::Request { .. } => "E_REQUEST",
            Self::Decode { .. } => "E_DECODE",
            Self::Storage(_) => "E_STORAGE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }
}

// =============================================================================
// STORAGE
// =============================================================================

/// Errors produced by the persistent key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("session file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("session file {path} is not valid JSON: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "E_STORAGE_IO",
            Self::Corrupt { .. } => "E_STORAGE_CORRUPT",
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Errors produced while reading client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),

    #[error("no config directory available; set THREATSCOPE_SESSION_FILE")]
    NoConfigDir,
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E_CONFIG_PARSE",
            Self::NoConfigDir => "E_CONFIG_NO_DIR",
        }
    }
}
