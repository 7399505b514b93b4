//! Contract recording with replay
//!
//! A [`PactRecorder`] accumulates request/response interaction pairs into a
//! [`Pact`] document over the course of a contract-test run. It also acts as
//! a [`TransportProvider`]: requests whose URL matches a recorded interaction
//! are answered with the recorded response, so a single run can generate the
//! contract and stub the provider at the same time. Matching is on URL only,
//! and a non-matching request falls through to the session's default
//! transport.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::model::{
    Interaction, InteractionRequest, InteractionResponse, MatchScope, Pact,
};
use crate::error::{Error, Result};
use crate::http::config::compose_url;
use crate::http::{
    BuiltRequest, ResponseMeta, Transport, TransportOutcome, TransportProvider,
};
use crate::types::HttpMethod;

fn json_headers() -> HashMap<String, String> {
    HashMap::from([(
        "Content-Type".to_string(),
        "application/json; charset=UTF-8".to_string(),
    )])
}

/// Records interactions against a base URL and replays them as stubs
pub struct PactRecorder {
    base_url: Url,
    request_headers: HashMap<String, String>,
    response_headers: HashMap<String, String>,
    pact: RwLock<Pact>,
}

impl PactRecorder {
    /// Create a recorder for the given provider/consumer pair.
    ///
    /// `pact_version` is the pact specification version emitted into the
    /// document metadata. Request and response snapshot headers default to
    /// JSON content types.
    pub fn new(
        base_url: Url,
        pact_version: &str,
        provider_name: &str,
        consumer_name: &str,
    ) -> Self {
        Self {
            base_url,
            request_headers: json_headers(),
            response_headers: json_headers(),
            pact: RwLock::new(Pact::new(provider_name, consumer_name, pact_version)),
        }
    }

    /// Replace the headers recorded into request snapshots
    pub fn with_request_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.request_headers = headers;
        self
    }

    /// Replace the headers recorded into response snapshots
    pub fn with_response_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.response_headers = headers;
        self
    }

    /// Construct a canonical interaction snapshot and append it.
    ///
    /// The request URL is built with the same normalization as session
    /// request construction, so later lookups match exactly. Fails when the
    /// URL cannot be constructed or the response status is not a valid HTTP
    /// status code. Interactions are never removed or reordered.
    pub fn add_interaction(
        &self,
        provider_state: &str,
        description: &str,
        method: HttpMethod,
        path: &str,
        parameters: &BTreeMap<String, String>,
        response_status: u16,
        response_body: Option<Value>,
    ) -> Result<()> {
        reqwest::StatusCode::from_u16(response_status).map_err(|e| Error::Contract {
            message: format!("invalid response status: {response_status}"),
            source: Some(anyhow::Error::new(e)),
        })?;

        let url = compose_url(&self.base_url, path, parameters)?;

        let interaction = Interaction {
            provider_state: provider_state.to_string(),
            description: description.to_string(),
            request: InteractionRequest {
                method,
                path: url.path().to_string(),
                query: url.query().map(str::to_string),
                url: url.as_str().to_string(),
                headers: self.request_headers.clone(),
            },
            response: InteractionResponse {
                status: response_status,
                headers: Some(self.response_headers.clone()),
                body: response_body,
            },
        };

        self.pact.write().unwrap().append(interaction);
        Ok(())
    }

    /// Snapshot of the accumulated contract document
    pub fn pact(&self) -> Pact {
        self.pact.read().unwrap().clone()
    }

    pub fn interaction_count(&self) -> usize {
        self.pact.read().unwrap().interactions().len()
    }

    /// Write the accumulated contract document to disk
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        self.pact().write_to(path)
    }
}

impl TransportProvider for PactRecorder {
    fn transport_for(&self, request: &BuiltRequest) -> Option<Arc<dyn Transport>> {
        let pact = self.pact.read().unwrap();
        let interaction = pact
            .interactions()
            .iter()
            .find(|interaction| interaction.matches(request, MatchScope::Url))?;

        debug!(url = request.url_str(), "replaying recorded interaction");
        Some(Arc::new(ReplayTransport {
            response: interaction.response.clone(),
        }))
    }
}

/// Replays one recorded response
struct ReplayTransport {
    response: InteractionResponse,
}

#[async_trait]
impl Transport for ReplayTransport {
    async fn execute(&self, request: &BuiltRequest) -> TransportOutcome {
        let body = self
            .response
            .body
            .as_ref()
            .and_then(|value| serde_json::to_vec(value).ok());

        TransportOutcome {
            response: Some(ResponseMeta {
                status: self.response.status,
                headers: self.response.headers.clone().unwrap_or_default(),
                url: request.url_str().to_string(),
            }),
            body,
            error: None,
        }
    }
}
