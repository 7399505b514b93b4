//! Request stubbing: canned responses matched by canonical URL
//!
//! A [`StubTransportProvider`] can be handed to a session (or a
//! [`NetworkClient`](crate::client::NetworkClient)) to intercept outgoing
//! requests and answer them from a registry instead of performing network
//! I/O. Match keys are built with the same URL construction as
//! [`Configuration`](crate::http::Configuration), so a registered stub and an
//! incoming request can only disagree when the requests themselves differ.
//!
//! The provider is strict: once a test opts into stub-based provisioning,
//! every request routed through it gets a deterministic outcome. A
//! non-matching request receives a synthesized `400` with an empty body
//! rather than falling through to live network I/O.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use url::Url;

use super::config::{build_url, BuiltRequest};
use super::transport::{ResponseMeta, Transport, TransportOutcome, TransportProvider};
use crate::error::{Error, Result};

/// A pre-registered response replayed for a matching request
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

/// Registry of canned responses keyed by fully-qualified URL string.
///
/// Registrations are last-write-wins; lookups are exact string matches with
/// no partial or fuzzy matching. The registry tolerates concurrent lookups
/// while registrations are serialized, so test setup may add stubs while
/// requests are in flight.
#[derive(Debug, Default)]
pub struct StubTransportProvider {
    stubs: Arc<RwLock<HashMap<String, CannedResponse>>>,
}

impl StubTransportProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stub from URL parts, built with the same normalization and
    /// encoding as request construction.
    #[allow(clippy::too_many_arguments)]
    pub fn add_stub(
        &self,
        scheme: &str,
        host: &str,
        path: &str,
        parameters: &BTreeMap<String, String>,
        headers: HashMap<String, String>,
        body: impl Into<Vec<u8>>,
        status: u16,
    ) -> Result<()> {
        let url = build_url(scheme, host, path, parameters)?;
        self.insert(
            url.as_str().to_string(),
            CannedResponse {
                status,
                headers,
                body: body.into(),
            },
        );
        Ok(())
    }

    /// Register a stub for an exact full URL
    pub fn add_stub_url(&self, full_url: &str, body: impl Into<Vec<u8>>, status: u16) -> Result<()> {
        let url = Url::parse(full_url).map_err(|e| Error::RequestConstruction {
            message: format!("invalid stub URL: {full_url}"),
            source: Some(anyhow::Error::new(e)),
        })?;
        self.insert(
            url.as_str().to_string(),
            CannedResponse {
                status,
                headers: HashMap::new(),
                body: body.into(),
            },
        );
        Ok(())
    }

    fn insert(&self, key: String, response: CannedResponse) {
        self.stubs.write().unwrap().insert(key, response);
    }

    /// Exact-match lookup against the request's canonical URL
    pub fn lookup(&self, request: &BuiltRequest) -> Option<CannedResponse> {
        self.stubs.read().unwrap().get(request.url_str()).cloned()
    }

    /// Remove all registrations (used between tests)
    pub fn remove_stubs(&self) {
        self.stubs.write().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.stubs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.read().unwrap().is_empty()
    }
}

impl TransportProvider for StubTransportProvider {
    fn transport_for(&self, _request: &BuiltRequest) -> Option<Arc<dyn Transport>> {
        // Strict: every request routed here is answered from the registry,
        // non-matches included.
        Some(Arc::new(StubTransport {
            stubs: Arc::clone(&self.stubs),
        }))
    }
}

struct StubTransport {
    stubs: Arc<RwLock<HashMap<String, CannedResponse>>>,
}

#[async_trait]
impl Transport for StubTransport {
    async fn execute(&self, request: &BuiltRequest) -> TransportOutcome {
        let canned = self.stubs.read().unwrap().get(request.url_str()).cloned();

        match canned {
            Some(canned) => TransportOutcome {
                response: Some(ResponseMeta {
                    status: canned.status,
                    headers: canned.headers,
                    url: request.url_str().to_string(),
                }),
                body: if canned.body.is_empty() {
                    None
                } else {
                    Some(canned.body)
                },
                error: None,
            },
            None => {
                log::warn!("no stub registered for {}", request.url_str());
                TransportOutcome {
                    response: Some(ResponseMeta {
                        status: 400,
                        headers: HashMap::new(),
                        url: request.url_str().to_string(),
                    }),
                    body: None,
                    error: None,
                }
            }
        }
    }
}
