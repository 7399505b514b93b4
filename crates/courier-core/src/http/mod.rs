//! HTTP client core
//!
//! This module provides the orchestration layer over the platform network
//! stack:
//! - Request building from an endpoint [`Configuration`]
//! - Pluggable [`TransportProvider`]s, real or stubbed
//! - Session lifecycle with exactly-once completion and cancellation
//! - Total classification of outcomes into a closed error set

pub mod config;
pub mod error;
pub mod session;
pub mod stub;
pub mod transport;

pub use config::{build_url, BuiltRequest, Configuration, TimeoutConfig, TransportSecurity};
pub use error::{classify, FailureDetail, NetworkError, TransportError};
pub use session::{
    BodyDecoder, Completion, JsonBodyDecoder, ModelBodyDecoder, Session, SessionOutcome,
    SessionState,
};
pub use stub::{CannedResponse, StubTransportProvider};
pub use transport::{HttpTransport, ResponseMeta, Transport, TransportOutcome, TransportProvider};

// Re-export commonly used types
pub use reqwest::StatusCode;
