//! Transport abstraction and the default reqwest-backed implementation
//!
//! A [`Transport`] executes one built request and reports a
//! [`TransportOutcome`]; a [`TransportProvider`] decides which transport (if
//! any) should handle a given request, which is the seam the stubbing and
//! contract-recording layers plug into.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::config::{BuiltRequest, Configuration, TransportSecurity};
use super::error::TransportError;
use crate::error::{Error, Result};
use crate::types::HttpMethod;

/// Status and header metadata of a received response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub url: String,
}

impl ResponseMeta {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Raw result of executing a request: produced exactly once per execution
#[derive(Debug, Default)]
pub struct TransportOutcome {
    pub response: Option<ResponseMeta>,
    pub body: Option<Vec<u8>>,
    pub error: Option<TransportError>,
}

/// Executes a built request, either against the network or from a stub
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &BuiltRequest) -> TransportOutcome;
}

/// Supplies a transport for a given request.
///
/// Returning `None` means "not mine": the session falls back to a freshly
/// constructed default transport bound to its configuration.
pub trait TransportProvider: Send + Sync {
    fn transport_for(&self, request: &BuiltRequest) -> Option<Arc<dyn Transport>>;
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

/// Default transport delegating to the platform network stack via reqwest
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport honouring the configuration's timeouts and
    /// transport security policy.
    pub fn new(configuration: &Configuration) -> Result<Self> {
        let timeouts = configuration.timeouts();
        let mut builder = reqwest::Client::builder()
            .connect_timeout(timeouts.connect_timeout)
            .timeout(timeouts.request_timeout);

        if let TransportSecurity::PinnedCertificates(certificates) = configuration.security() {
            builder = builder.tls_built_in_root_certs(false);
            for der in certificates {
                let certificate =
                    reqwest::Certificate::from_der(der).map_err(|e| Error::Configuration {
                        message: "invalid pinned certificate".to_string(),
                        source: Some(anyhow::Error::new(e)),
                    })?;
                builder = builder.add_root_certificate(certificate);
            }
        }

        let client = builder.build().map_err(|e| Error::Configuration {
            message: "failed to construct HTTP client".to_string(),
            source: Some(anyhow::Error::new(e)),
        })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &BuiltRequest) -> TransportOutcome {
        debug!(url = request.url_str(), method = %request.method, "executing request");

        let mut builder = self
            .client
            .request(request.method.into(), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(error) => {
                return TransportOutcome {
                    response: None,
                    body: None,
                    error: Some(error.into()),
                }
            }
        };

        let meta = ResponseMeta {
            status: response.status().as_u16(),
            headers: response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.to_string(), value.to_string()))
                })
                .collect(),
            url: response.url().to_string(),
        };

        match response.bytes().await {
            Ok(bytes) if bytes.is_empty() => TransportOutcome {
                response: Some(meta),
                body: None,
                error: None,
            },
            Ok(bytes) => TransportOutcome {
                response: Some(meta),
                body: Some(bytes.to_vec()),
                error: None,
            },
            Err(error) => TransportOutcome {
                response: Some(meta),
                body: None,
                error: Some(error.into()),
            },
        }
    }
}
