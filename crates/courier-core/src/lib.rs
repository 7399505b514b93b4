//! Courier Core - stub-friendly HTTP client with contract recording
//!
//! This crate provides a thin convenience layer over the platform HTTP
//! stack for a single client application: it builds requests from a base
//! configuration, executes them through a pluggable transport abstraction,
//! decodes JSON responses, and classifies HTTP outcomes into a closed error
//! set.
//!
//! # Main Components
//!
//! - **Configuration**: base URL, default headers, timeouts and transport
//!   security, turned into concrete requests
//! - **Session**: one request/response exchange with an exactly-once
//!   completion callback and cooperative cancellation
//! - **Stubbing**: a [`http::StubTransportProvider`] answering matching
//!   requests from a registry instead of the network
//! - **Contract recording**: a [`pact::PactRecorder`] capturing interactions
//!   into a broker-compatible pact document
//!
//! # Example
//!
//! ```no_run
//! use courier_core::{Configuration, NetworkClient, RequestDescriptor, Result};
//!
//! fn example() -> Result<()> {
//!     let configuration = Configuration::new("https", "api.example.com")?
//!         .with_default_header("Accept", "application/json");
//!     let client = NetworkClient::new(configuration, None);
//!
//!     let session = client.session(
//!         RequestDescriptor::get("/v2/list-time-zone").with_query_param("country", "GB"),
//!         |outcome| {
//!             if let Some(body) = outcome.body {
//!                 println!("zones: {body}");
//!             }
//!         },
//!     );
//!     session.start()
//! }
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod http;
pub mod pact;
pub mod types;

// Re-export main types for convenience
pub use client::{NetworkClient, PactNetworkClient, StubbedInteractions};
pub use error::{Error, Result};
pub use http::{
    classify, BodyDecoder, BuiltRequest, CannedResponse, Configuration, FailureDetail,
    HttpTransport, JsonBodyDecoder, ModelBodyDecoder, NetworkError, ResponseMeta, Session,
    SessionOutcome, SessionState, StubTransportProvider, TimeoutConfig, Transport,
    TransportError, TransportOutcome, TransportProvider, TransportSecurity,
};
pub use pact::{Interaction, MatchScope, Pact, PactRecorder};
pub use types::{HttpMethod, RequestDescriptor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
