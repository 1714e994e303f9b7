//! Error types for the ConfigWeaver console

use thiserror::Error;

/// Main error type for the console
///
/// The taxonomy mirrors how failures surface to the operator: authentication
/// failures force a re-login, validation failures stay inline and are never
/// submitted, transient backend failures become notices, and cancelled
/// requests are discarded silently.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Request was sent but no response was received
    #[error("No response received from backend")]
    NetworkError(#[from] reqwest::Error),

    /// Session token missing, expired, or rejected (HTTP 401)
    #[error("Authentication required")]
    Unauthorized,

    /// Backend rejected the request; `detail` is the user-facing text
    #[error("{detail}")]
    ApiError { status: u16, detail: String },

    /// Client-side validation failure, surfaced inline and never submitted
    #[error("{0}")]
    ValidationError(String),

    /// Request abandoned because its view was torn down
    #[error("Request cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ConsoleError::ApiError { status, .. } => Some(*status),
            ConsoleError::Unauthorized => Some(401),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for ConsoleError {
    fn from(err: anyhow::Error) -> Self {
        ConsoleError::Internal(err.to_string())
    }
}
