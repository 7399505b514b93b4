//! Error types for the courier core library
//!
//! Construction-time failures (bad base URL, malformed paths or queries,
//! invalid canned responses) surface synchronously through these types.
//! Transport-time failures are reported once through a session's completion
//! callback as a [`NetworkError`](crate::http::NetworkError) instead.

use thiserror::Error;

/// Main error type for courier operations
#[derive(Error, Debug)]
pub enum Error {
    /// Endpoint configuration errors (invalid scheme/host, bad TLS material)
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Request construction errors (URL building, path encoding, headers)
    #[error("Request construction error: {message}")]
    RequestConstruction {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Session lifecycle violations, e.g. starting a session twice
    #[error("Session error: {message}")]
    Session { message: String },

    /// Contract recording errors (invalid interaction snapshots)
    #[error("Contract error: {message}")]
    Contract {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON encoding and decoding errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors, e.g. while writing a contract document to disk
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn request(message: impl Into<String>) -> Self {
        Error::RequestConstruction {
            message: message.into(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}
