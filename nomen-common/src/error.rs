//! Common error types for nomen

use thiserror::Error;

/// Common result type for nomen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across nomen pipeline stages
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration; fatal before any network call
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote API answered with a non-success status
    #[error("HTTP {status} from {operation}: {body}")]
    Http {
        operation: String,
        status: u16,
        body: String,
    },

    /// Request did not complete within the client timeout
    #[error("Timeout during {0}")]
    Timeout(String),

    /// Connection-level failure (DNS, TLS, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed field value or missing expected column on one record
    #[error("Data error: {0}")]
    Data(String),

    /// Not enough labeled, tokenizable examples to learn from
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Configuration errors abort the run; everything else is scoped to a unit of work
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else if err.is_decode() {
            Error::Data(format!("Response decode failed: {}", err))
        } else {
            Error::Network(err.to_string())
        }
    }
}
