//! Error types shared by the library.
//!
//! The binary wraps these in `anyhow` at its edge and maps them to exit codes.

use http::StatusCode;
use thiserror::Error;

pub type DriftResult<T> = Result<T, DriftError>;

#[derive(Debug, Error)]
pub enum DriftError {
    /// Mandatory setting missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Malformed JSON in a file or a response.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("i/o failure on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DriftError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        DriftError::Configuration(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        DriftError::Parse(msg.into())
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        DriftError::Io { path: path.into(), source }
    }
}

/// No usable credential could be obtained.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no credentials available")]
    NoCredentials,

    #[error("authentication failed: {0}")]
    ExchangeFailed(#[source] TransportError),
}

/// Failure of a single HTTP exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}
