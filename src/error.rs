//! Error types for the `premia` crate.
//!
//! All fallible operations in this crate return [`Result<T>`], which is an
//! alias for `std::result::Result<T, PremiaError>`.
//!
//! [`PremiaError`] covers:
//! - **Authentication errors** — Token refresh rejected by the broker
//! - **Not found** — Unknown instrument or no contract for an expiry/side
//! - **API errors** — Structured `s: "error"` responses from the broker
//! - **HTTP status errors** — Unexpected status codes with response body
//! - **HTTP transport errors** — Network, TLS, timeout failures
//! - **JSON / I/O errors** — Deserialization and file store failures
//! - **Validation errors** — Bad request input (side, expiry date, lot size)
//! - **Config errors** — Missing credentials or invalid settings
//!
//! Use [`PremiaError::kind`] to branch on the cause without matching every
//! variant.

use std::fmt;

/// Error envelope returned by the Fyers API (`{"s": "error", "code": .., "message": ..}`).
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiErrorBody {
    /// Status string, `"ok"` or `"error"`.
    #[serde(default)]
    pub s: Option<String>,
    /// Broker error code (negative for Fyers errors).
    #[serde(default)]
    pub code: Option<i64>,
    /// Human-readable description of the error.
    #[serde(default)]
    pub message: Option<String>,
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(
                f,
                "[{}] {}",
                code,
                self.message.as_deref().unwrap_or("Unknown error")
            ),
            None => f.write_str(self.message.as_deref().unwrap_or("Unknown error")),
        }
    }
}

/// Coarse classification of a [`PremiaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The broker refused to issue an access token.
    Authentication,
    /// The requested instrument or contract does not exist.
    NotFound,
    /// A broker endpoint failed or answered with an error.
    Upstream,
    /// The caller supplied invalid input.
    Validation,
    /// Local failure: file store, serialization, configuration.
    Internal,
}

/// All possible errors produced by `premia`.
#[derive(Debug, thiserror::Error)]
pub enum PremiaError {
    /// Access-token refresh failed. Carries the broker's message.
    #[error("Failed to refresh access token: {0}")]
    Authentication(String),

    /// No symbol or contract matches the request.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An error response returned by a broker REST API.
    #[error("API error: {0}")]
    Api(ApiErrorBody),

    /// The server returned an unexpected HTTP status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code.
        status: reqwest::StatusCode,
        /// The response body text.
        body: String,
    },

    /// A symbol-master source could not be fetched.
    #[error("Failed to fetch symbols from {url}: {reason}")]
    SymbolSource {
        /// The source URL.
        url: String,
        /// Why the fetch failed.
        reason: String,
    },

    /// A network or transport-level error from `reqwest`.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to (de)serialize JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error building or parsing a URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The caller provided an invalid argument.
    #[error("Invalid argument: {0}")]
    Validation(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PremiaError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Api(_) | Self::HttpStatus { .. } | Self::SymbolSource { .. } | Self::Http(_) => {
                ErrorKind::Upstream
            }
            Self::Validation(_) => ErrorKind::Validation,
            Self::Json(_) | Self::Io(_) | Self::Url(_) | Self::Config(_) => ErrorKind::Internal,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PremiaError>;
