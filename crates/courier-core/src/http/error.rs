//! Transport outcome classification
//!
//! Maps a raw transport outcome (status code, payload, transport-level
//! failure) into a closed set of error categories. Classification is total:
//! every outcome maps to exactly one category, with [`NetworkError::Other`]
//! as the catch-all, and success statuses map to no error at all.

use serde_json::Value;
use thiserror::Error;

use super::transport::ResponseMeta;

/// Transport-level failure, independent of any HTTP status
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {message}")]
    Connection { message: String },

    #[error("transport failure: {message}")]
    Other { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout
        } else if error.is_connect() {
            TransportError::Connection {
                message: error.to_string(),
            }
        } else {
            TransportError::Other {
                message: error.to_string(),
            }
        }
    }
}

/// Context attached to a classified failure: the underlying transport error,
/// the status-bearing response metadata, and any decoded server payload.
#[derive(Debug, Default)]
pub struct FailureDetail {
    pub transport_error: Option<TransportError>,
    pub response: Option<ResponseMeta>,
    pub payload: Option<Value>,
}

impl FailureDetail {
    fn status_display(&self) -> String {
        match self.response.as_ref() {
            Some(meta) => meta.status.to_string(),
            None => "no status".to_string(),
        }
    }
}

/// Closed classification of a request outcome
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The response body could not be decoded; the raw payload is preserved
    /// for diagnostics
    #[error("response body could not be decoded")]
    SerializationFailed {
        #[source]
        source: serde_json::Error,
        payload: Option<Vec<u8>>,
    },

    /// The session was cancelled before its transport reported back
    #[error("request was cancelled")]
    TaskCancelled,

    #[error("bad request (400)")]
    BadRequest(FailureDetail),

    #[error("unauthorized (401)")]
    Unauthorized(FailureDetail),

    #[error("forbidden (403)")]
    Forbidden(FailureDetail),

    #[error("not found (404)")]
    NotFound(FailureDetail),

    #[error("client error ({})", .0.status_display())]
    OtherClientError(FailureDetail),

    #[error("server error ({})", .0.status_display())]
    ServerError(FailureDetail),

    /// Everything else, including absent or out-of-range statuses
    #[error("unrecognized outcome ({})", .0.status_display())]
    Other(FailureDetail),
}

impl NetworkError {
    /// Failure context, when the category carries one
    pub fn detail(&self) -> Option<&FailureDetail> {
        match self {
            NetworkError::BadRequest(detail)
            | NetworkError::Unauthorized(detail)
            | NetworkError::Forbidden(detail)
            | NetworkError::NotFound(detail)
            | NetworkError::OtherClientError(detail)
            | NetworkError::ServerError(detail)
            | NetworkError::Other(detail) => Some(detail),
            NetworkError::SerializationFailed { .. } | NetworkError::TaskCancelled => None,
        }
    }

    /// Status code from the attached response metadata, when present
    pub fn status(&self) -> Option<u16> {
        self.detail()
            .and_then(|detail| detail.response.as_ref())
            .map(|meta| meta.status)
    }
}

/// Classify a transport outcome.
///
/// Returns `None` for statuses in `[200, 300)`. Exact 400/401/403/404 take
/// priority over the broader client-error bucket; any other status in
/// `[400, 500)` is [`NetworkError::OtherClientError`], `[500, 600)` is
/// [`NetworkError::ServerError`], and everything else — including an absent
/// status, as with a connection failure — is [`NetworkError::Other`].
pub fn classify(
    transport_error: Option<TransportError>,
    response: Option<ResponseMeta>,
    payload: Option<Value>,
) -> Option<NetworkError> {
    let status = response.as_ref().map(|meta| meta.status);
    let detail = FailureDetail {
        transport_error,
        response,
        payload,
    };

    match status {
        Some(code) if (200..300).contains(&code) => None,
        Some(400) => Some(NetworkError::BadRequest(detail)),
        Some(401) => Some(NetworkError::Unauthorized(detail)),
        Some(403) => Some(NetworkError::Forbidden(detail)),
        Some(404) => Some(NetworkError::NotFound(detail)),
        Some(code) if (400..500).contains(&code) => Some(NetworkError::OtherClientError(detail)),
        Some(code) if (500..600).contains(&code) => Some(NetworkError::ServerError(detail)),
        _ => Some(NetworkError::Other(detail)),
    }
}
