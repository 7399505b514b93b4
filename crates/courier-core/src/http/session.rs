//! Session orchestration: one request/response exchange
//!
//! A [`Session`] builds its request from a shared [`Configuration`], obtains
//! a transport (from an injected [`TransportProvider`] or a default
//! [`HttpTransport`]), issues exactly one asynchronous call, classifies the
//! outcome, and invokes its completion callback exactly once. Sessions are
//! single-shot: a second `start` fails fast, and independent sessions may run
//! concurrently sharing only the read-only configuration and provider.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::config::{BuiltRequest, Configuration};
use super::error::{classify, NetworkError};
use super::transport::{
    HttpTransport, ResponseMeta, Transport, TransportOutcome, TransportProvider,
};
use crate::error::{Error, Result};
use crate::types::RequestDescriptor;

/// Strategy for decoding a successful response body
pub trait BodyDecoder: Send + Sync + 'static {
    type Body: Send + 'static;

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Self::Body, serde_json::Error>;
}

/// Decodes the body as a dynamic JSON value
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBodyDecoder;

impl BodyDecoder for JsonBodyDecoder {
    type Body = Value;

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Value, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Decodes the body into a typed model
pub struct ModelBodyDecoder<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for ModelBodyDecoder<T> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> BodyDecoder for ModelBodyDecoder<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Body = T;

    fn decode(&self, bytes: &[u8]) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Everything a completion callback receives about the exchange
#[derive(Debug)]
pub struct SessionOutcome<B> {
    /// Response metadata, when a response was received
    pub response: Option<ResponseMeta>,
    /// Decoded body on success
    pub body: Option<B>,
    /// Classified error, `None` for a successful 2xx outcome
    pub error: Option<NetworkError>,
    /// Whether the session was cancelled
    pub cancelled: bool,
}

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Started,
    Completed,
    Cancelled,
}

/// Completion callback, invoked exactly once per session
pub type Completion<B> = Box<dyn FnOnce(SessionOutcome<B>) + Send + 'static>;

/// One request/response exchange
pub struct Session<D: BodyDecoder = JsonBodyDecoder> {
    descriptor: RequestDescriptor,
    configuration: Arc<Configuration>,
    provider: Option<Arc<dyn TransportProvider>>,
    decoder: Arc<D>,
    state: Arc<Mutex<SessionState>>,
    completion: Arc<Mutex<Option<Completion<D::Body>>>>,
    cancel: Mutex<Option<oneshot::Sender<()>>>,
}

impl Session<JsonBodyDecoder> {
    /// Create a JSON session
    pub fn new(
        descriptor: RequestDescriptor,
        configuration: Arc<Configuration>,
        provider: Option<Arc<dyn TransportProvider>>,
        completion: impl FnOnce(SessionOutcome<Value>) + Send + 'static,
    ) -> Self {
        Self::with_decoder(descriptor, configuration, provider, JsonBodyDecoder, completion)
    }
}

impl<D: BodyDecoder> Session<D> {
    /// Create a session with an explicit decoding strategy
    pub fn with_decoder(
        descriptor: RequestDescriptor,
        configuration: Arc<Configuration>,
        provider: Option<Arc<dyn TransportProvider>>,
        decoder: D,
        completion: impl FnOnce(SessionOutcome<D::Body>) + Send + 'static,
    ) -> Self {
        Self {
            descriptor,
            configuration,
            provider,
            decoder: Arc::new(decoder),
            state: Arc::new(Mutex::new(SessionState::Idle)),
            completion: Arc::new(Mutex::new(Some(Box::new(completion)))),
            cancel: Mutex::new(None),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap()
    }

    /// Build the request and issue exactly one asynchronous call.
    ///
    /// Fails fast with [`Error::Session`] when the session has already been
    /// started or cancelled, and with a construction error when the request
    /// cannot be built. Must be called within a tokio runtime.
    pub fn start(&self) -> Result<()> {
        {
            let mut state = self.state.lock().unwrap();
            if *state != SessionState::Idle {
                return Err(Error::Session {
                    message: format!("cannot start session in state {:?}", *state),
                });
            }
            *state = SessionState::Started;
        }

        match self.launch() {
            Ok(()) => Ok(()),
            Err(error) => {
                *self.state.lock().unwrap() = SessionState::Idle;
                Err(error)
            }
        }
    }

    fn launch(&self) -> Result<()> {
        let request = self.configuration.build(&self.descriptor)?;

        let transport = match self
            .provider
            .as_ref()
            .and_then(|provider| provider.transport_for(&request))
        {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.configuration)?) as Arc<dyn Transport>,
        };

        let (cancel_tx, mut cancel_rx) = oneshot::channel();
        *self.cancel.lock().unwrap() = Some(cancel_tx);

        let state = Arc::clone(&self.state);
        let completion = Arc::clone(&self.completion);
        let decoder = Arc::clone(&self.decoder);

        debug!(url = request.url_str(), "session started");

        tokio::spawn(async move {
            tokio::select! {
                // Cancellation fires the completion synchronously from
                // `cancel`; nothing left to do here but drop the call.
                _ = &mut cancel_rx => {}
                outcome = transport.execute(&request) => {
                    finish(&state, &completion, decoder.as_ref(), outcome);
                }
            }
        });

        Ok(())
    }

    /// Abort an in-flight call.
    ///
    /// The completion fires synchronously with
    /// [`NetworkError::TaskCancelled`] and a cancelled flag of `true`.
    /// Cancelling an already-completed session is a no-op.
    pub fn cancel(&self) {
        if let Some(cancel_tx) = self.cancel.lock().unwrap().take() {
            let _ = cancel_tx.send(());
        }

        let callback = self.completion.lock().unwrap().take();
        if let Some(callback) = callback {
            *self.state.lock().unwrap() = SessionState::Cancelled;
            warn!("session cancelled before completion");
            callback(SessionOutcome {
                response: None,
                body: None,
                error: Some(NetworkError::TaskCancelled),
                cancelled: true,
            });
        }
    }
}

/// Classify the raw outcome and fire the completion, if it has not fired yet
fn finish<D: BodyDecoder>(
    state: &Mutex<SessionState>,
    completion: &Mutex<Option<Completion<D::Body>>>,
    decoder: &D,
    outcome: TransportOutcome,
) {
    let Some(callback) = completion.lock().unwrap().take() else {
        return;
    };

    let TransportOutcome {
        response,
        body,
        error,
    } = outcome;

    let payload = body
        .as_deref()
        .and_then(|bytes| serde_json::from_slice::<Value>(bytes).ok());
    let classified = classify(error, response.clone(), payload);

    let (decoded, classified) = match classified {
        Some(error) => (None, Some(error)),
        None => match body.as_deref() {
            None => (None, None),
            Some(bytes) => match decoder.decode(bytes) {
                Ok(decoded) => (Some(decoded), None),
                Err(source) => (
                    None,
                    Some(NetworkError::SerializationFailed {
                        source,
                        payload: body.clone(),
                    }),
                ),
            },
        },
    };

    *state.lock().unwrap() = SessionState::Completed;
    callback(SessionOutcome {
        response,
        body: decoded,
        error: classified,
        cancelled: false,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedTransport {
        status: u16,
        body: Option<Vec<u8>>,
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn execute(&self, request: &BuiltRequest) -> TransportOutcome {
            TransportOutcome {
                response: Some(ResponseMeta {
                    status: self.status,
                    headers: HashMap::new(),
                    url: request.url_str().to_string(),
                }),
                body: self.body.clone(),
                error: None,
            }
        }
    }

    /// Never reports back within test time
    struct PendingTransport;

    #[async_trait]
    impl Transport for PendingTransport {
        async fn execute(&self, _request: &BuiltRequest) -> TransportOutcome {
            tokio::time::sleep(Duration::from_secs(60)).await;
            TransportOutcome::default()
        }
    }

    struct FixedProvider(Arc<dyn Transport>);

    impl TransportProvider for FixedProvider {
        fn transport_for(&self, _request: &BuiltRequest) -> Option<Arc<dyn Transport>> {
            Some(Arc::clone(&self.0))
        }
    }

    fn configuration() -> Arc<Configuration> {
        Arc::new(Configuration::new("https", "mock-host").unwrap())
    }

    fn provider(transport: impl Transport + 'static) -> Option<Arc<dyn TransportProvider>> {
        Some(Arc::new(FixedProvider(Arc::new(transport))))
    }

    #[tokio::test]
    async fn test_successful_exchange_decodes_body() {
        let (tx, rx) = oneshot::channel();
        let session = Session::new(
            RequestDescriptor::get("/mock-path"),
            configuration(),
            provider(FixedTransport {
                status: 200,
                body: Some(br#"{"zones":[{"countryCode":"GB"}]}"#.to_vec()),
            }),
            move |outcome| {
                let _ = tx.send(outcome);
            },
        );

        session.start().unwrap();
        let outcome = rx.await.unwrap();

        assert!(outcome.error.is_none());
        assert!(!outcome.cancelled);
        assert_eq!(outcome.response.as_ref().unwrap().status, 200);
        assert_eq!(
            outcome.body.unwrap()["zones"][0]["countryCode"],
            Value::from("GB")
        );
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[tokio::test]
    async fn test_success_with_undecodable_body_is_serialization_failure() {
        let (tx, rx) = oneshot::channel();
        let session = Session::new(
            RequestDescriptor::get("/mock-path"),
            configuration(),
            provider(FixedTransport {
                status: 200,
                body: Some(b"{not json".to_vec()),
            }),
            move |outcome| {
                let _ = tx.send(outcome);
            },
        );

        session.start().unwrap();
        let outcome = rx.await.unwrap();

        assert!(outcome.body.is_none());
        match outcome.error.unwrap() {
            NetworkError::SerializationFailed { payload, .. } => {
                assert_eq!(payload.unwrap(), b"{not json".to_vec());
            }
            other => panic!("expected SerializationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_status_is_classified() {
        let (tx, rx) = oneshot::channel();
        let session = Session::new(
            RequestDescriptor::get("/mock-path"),
            configuration(),
            provider(FixedTransport {
                status: 404,
                body: Some(br#"{"message":"no such resource"}"#.to_vec()),
            }),
            move |outcome| {
                let _ = tx.send(outcome);
            },
        );

        session.start().unwrap();
        let outcome = rx.await.unwrap();

        assert!(outcome.body.is_none());
        let error = outcome.error.unwrap();
        assert!(matches!(error, NetworkError::NotFound(_)));
        assert_eq!(error.status(), Some(404));
        assert_eq!(
            error.detail().unwrap().payload.as_ref().unwrap()["message"],
            Value::from("no such resource")
        );
    }

    #[tokio::test]
    async fn test_second_start_fails_fast() {
        let session = Session::new(
            RequestDescriptor::get("/mock-path"),
            configuration(),
            provider(PendingTransport),
            |_| {},
        );

        session.start().unwrap();
        let second = session.start();
        assert!(matches!(second, Err(Error::Session { .. })));
    }

    #[tokio::test]
    async fn test_cancel_fires_completion_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = oneshot::channel();

        let calls_in_callback = Arc::clone(&calls);
        let session = Session::new(
            RequestDescriptor::get("/mock-path"),
            configuration(),
            provider(PendingTransport),
            move |outcome| {
                calls_in_callback.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send(outcome);
            },
        );

        session.start().unwrap();
        session.cancel();

        let outcome = rx.await.unwrap();
        assert!(outcome.cancelled);
        assert!(matches!(outcome.error, Some(NetworkError::TaskCancelled)));
        assert_eq!(session.state(), SessionState::Cancelled);

        // A second cancel is a no-op
        session.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_after_completion_is_noop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = oneshot::channel();

        let calls_in_callback = Arc::clone(&calls);
        let session = Session::new(
            RequestDescriptor::get("/mock-path"),
            configuration(),
            provider(FixedTransport {
                status: 200,
                body: None,
            }),
            move |outcome| {
                calls_in_callback.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send(outcome);
            },
        );

        session.start().unwrap();
        let outcome = rx.await.unwrap();
        assert!(outcome.error.is_none());
        assert!(outcome.body.is_none());

        session.cancel();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[tokio::test]
    async fn test_typed_decoding_strategy() {
        #[derive(Debug, serde::Deserialize)]
        struct Zone {
            #[serde(rename = "countryCode")]
            country_code: String,
        }

        let (tx, rx) = oneshot::channel();
        let session = Session::with_decoder(
            RequestDescriptor::get("/mock-path"),
            configuration(),
            provider(FixedTransport {
                status: 200,
                body: Some(br#"{"countryCode":"GB"}"#.to_vec()),
            }),
            ModelBodyDecoder::<Zone>::default(),
            move |outcome| {
                let _ = tx.send(outcome);
            },
        );

        session.start().unwrap();
        let outcome = rx.await.unwrap();
        assert_eq!(outcome.body.unwrap().country_code, "GB");
    }
}
