//! Error types for the urbanity library.

use thiserror::Error;

/// Errors that can occur when querying TIGERweb.
#[derive(Error, Debug)]
pub enum UrbanityError {
    /// The HTTP request could not be completed (DNS, connect, TLS, timeout, body read).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// TIGERweb answered with a non-2xx status.
    #[error("TIGERweb returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// The response body was not valid JSON or did not match the expected layout.
    #[error("Failed to decode TIGERweb response: {0}")]
    Decode(#[from] serde_json::Error),

    /// TIGERweb answered 200 but the body carried an ArcGIS `error` object.
    #[error("TIGERweb service error {code}: {message}")]
    Service { code: i64, message: String },

    /// The client configuration is unusable.
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

impl UrbanityError {
    /// Short, stable label for the error class, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            UrbanityError::Transport(_) => "transport",
            UrbanityError::HttpStatus { .. } => "http_status",
            UrbanityError::Decode(_) => "decode",
            UrbanityError::Service { .. } => "service",
            UrbanityError::Config { .. } => "config",
        }
    }
}

/// Result type alias using [`UrbanityError`].
pub type Result<T> = std::result::Result<T, UrbanityError>;
