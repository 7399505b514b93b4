//! Client facades
//!
//! [`NetworkClient`] couples a shared [`Configuration`] with an optional
//! [`TransportProvider`] and hands out ready-to-start sessions.
//! [`PactNetworkClient`] does the same with a [`PactRecorder`], so selected
//! request responses can be stubbed while every stub is captured into a
//! contract document ready for a broker.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::http::{
    BodyDecoder, Configuration, JsonBodyDecoder, Session, SessionOutcome, TransportProvider,
};
use crate::pact::{Pact, PactRecorder};
use crate::types::{HttpMethod, RequestDescriptor};

/// Creates sessions bound to one configuration and transport provider
pub struct NetworkClient {
    configuration: Arc<Configuration>,
    provider: Option<Arc<dyn TransportProvider>>,
}

impl NetworkClient {
    pub fn new(
        configuration: Configuration,
        provider: Option<Arc<dyn TransportProvider>>,
    ) -> Self {
        Self {
            configuration: Arc::new(configuration),
            provider,
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Create a JSON session for the given descriptor
    pub fn session(
        &self,
        descriptor: RequestDescriptor,
        completion: impl FnOnce(SessionOutcome<Value>) + Send + 'static,
    ) -> Session<JsonBodyDecoder> {
        Session::new(
            descriptor,
            Arc::clone(&self.configuration),
            self.provider.clone(),
            completion,
        )
    }

    /// Create a session with an explicit response-decoding strategy
    pub fn session_with_decoder<D: BodyDecoder>(
        &self,
        descriptor: RequestDescriptor,
        decoder: D,
        completion: impl FnOnce(SessionOutcome<D::Body>) + Send + 'static,
    ) -> Session<D> {
        Session::with_decoder(
            descriptor,
            Arc::clone(&self.configuration),
            self.provider.clone(),
            decoder,
            completion,
        )
    }
}

/// Stubbing surface based on pact interactions
pub trait StubbedInteractions {
    /// Stub the response for one request, recording the pair as a contract
    /// interaction.
    #[allow(clippy::too_many_arguments)]
    fn add_stubbed_interaction(
        &self,
        provider_state: &str,
        description: &str,
        method: HttpMethod,
        path: &str,
        parameters: &BTreeMap<String, String>,
        response_status: u16,
        response_body: Option<Value>,
    ) -> Result<()>;
}

/// Network client that stubs selected responses from recorded pact
/// interactions and gathers them into a contract document.
pub struct PactNetworkClient {
    configuration: Arc<Configuration>,
    recorder: Arc<PactRecorder>,
}

impl PactNetworkClient {
    pub fn new(configuration: Configuration, recorder: PactRecorder) -> Self {
        Self {
            configuration: Arc::new(configuration),
            recorder: Arc::new(recorder),
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn recorder(&self) -> &PactRecorder {
        &self.recorder
    }

    /// Snapshot of the contract gathered so far
    pub fn pact(&self) -> Pact {
        self.recorder.pact()
    }

    /// Create a JSON session whose response is replayed from a matching
    /// recorded interaction, falling through to the default transport when
    /// nothing matches.
    pub fn session(
        &self,
        descriptor: RequestDescriptor,
        completion: impl FnOnce(SessionOutcome<Value>) + Send + 'static,
    ) -> Session<JsonBodyDecoder> {
        Session::new(
            descriptor,
            Arc::clone(&self.configuration),
            Some(self.recorder.clone() as Arc<dyn TransportProvider>),
            completion,
        )
    }
}

impl StubbedInteractions for PactNetworkClient {
    fn add_stubbed_interaction(
        &self,
        provider_state: &str,
        description: &str,
        method: HttpMethod,
        path: &str,
        parameters: &BTreeMap<String, String>,
        response_status: u16,
        response_body: Option<Value>,
    ) -> Result<()> {
        self.recorder.add_interaction(
            provider_state,
            description,
            method,
            path,
            parameters,
            response_status,
            response_body,
        )
    }
}
