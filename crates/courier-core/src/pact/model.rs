//! Pact contract document model
//!
//! The serialized shape is fixed for compatibility with contract-broker
//! tooling: top-level `provider.name`, `consumer.name`,
//! `metadata.pactSpecification.version` and `interactions[]`, where each
//! interaction carries `provider_state`, `description`,
//! `request{method,path,query}` and `response{status,headers,body}`.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::http::BuiltRequest;
use crate::types::HttpMethod;

/// A participant in a contract (consumer or provider)
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Participant {
    pub name: String,
}

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Pact specification version
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PactSpecification {
    pub version: String,
}

/// Contract metadata
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PactMetadata {
    #[serde(rename = "pactSpecification")]
    pub pact_specification: PactSpecification,
}

/// Which parts of a recorded request participate in matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchScope {
    Url,
    Headers,
    UrlAndHeaders,
}

/// Request snapshot of an interaction.
///
/// Only method, path and query are part of the serialized contract; the full
/// URL and the request headers are kept for stub matching.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionRequest {
    pub method: HttpMethod,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip)]
    pub url: String,
    #[serde(skip)]
    pub headers: HashMap<String, String>,
}

/// Response snapshot of an interaction
#[derive(Debug, Clone, Serialize)]
pub struct InteractionResponse {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// One recorded request/response pair
#[derive(Debug, Clone, Serialize)]
pub struct Interaction {
    pub provider_state: String,
    pub description: String,
    pub request: InteractionRequest,
    pub response: InteractionResponse,
}

impl Interaction {
    /// Whether this interaction's recorded request matches an outgoing one
    pub fn matches(&self, request: &BuiltRequest, scope: MatchScope) -> bool {
        let url_matches = self.request.url == request.url_str();
        let headers_match = self.request.headers == request.headers;

        match scope {
            MatchScope::Url => url_matches,
            MatchScope::Headers => headers_match,
            MatchScope::UrlAndHeaders => url_matches && headers_match,
        }
    }
}

/// A contract document: provider/consumer identity plus an append-only,
/// insertion-ordered list of interactions.
#[derive(Debug, Clone, Serialize)]
pub struct Pact {
    pub provider: Participant,
    pub consumer: Participant,
    pub metadata: PactMetadata,
    interactions: Vec<Interaction>,
}

impl Pact {
    /// Create an empty contract. `version` is the pact specification
    /// version; versioning of the contract itself is handled by the broker.
    pub fn new(provider_name: &str, consumer_name: &str, version: &str) -> Self {
        Self {
            provider: Participant::new(provider_name),
            consumer: Participant::new(consumer_name),
            metadata: PactMetadata {
                pact_specification: PactSpecification {
                    version: version.to_string(),
                },
            },
            interactions: Vec::new(),
        }
    }

    /// Append an interaction. Existing entries are never removed or
    /// reordered.
    pub fn append(&mut self, interaction: Interaction) {
        self.interactions.push(interaction);
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Serialize to a JSON value in the broker-compatible shape
    pub fn to_json_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Serialize to a pretty-printed JSON document
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the serialized contract document to disk
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Configuration;
    use crate::types::RequestDescriptor;

    fn interaction(url: &str, path: &str, description: &str) -> Interaction {
        Interaction {
            provider_state: "provider is up".to_string(),
            description: description.to_string(),
            request: InteractionRequest {
                method: HttpMethod::Get,
                path: path.to_string(),
                query: None,
                url: url.to_string(),
                headers: HashMap::new(),
            },
            response: InteractionResponse {
                status: 200,
                headers: None,
                body: Some(serde_json::json!({"ok": true})),
            },
        }
    }

    #[test]
    fn test_document_shape() {
        let mut pact = Pact::new("mock-provider", "mock-consumer", "2.0.0");
        pact.append(interaction(
            "https://mock-host/mock-path",
            "/mock-path",
            "get mock data",
        ));

        let value = pact.to_json_value().unwrap();

        assert_eq!(value["provider"]["name"], "mock-provider");
        assert_eq!(value["consumer"]["name"], "mock-consumer");
        assert_eq!(value["metadata"]["pactSpecification"]["version"], "2.0.0");

        let interactions = value["interactions"].as_array().unwrap();
        assert_eq!(interactions.len(), 1);
        assert_eq!(interactions[0]["provider_state"], "provider is up");
        assert_eq!(interactions[0]["description"], "get mock data");
        assert_eq!(interactions[0]["request"]["method"], "GET");
        assert_eq!(interactions[0]["request"]["path"], "/mock-path");
        assert_eq!(interactions[0]["response"]["status"], 200);
        assert_eq!(interactions[0]["response"]["body"]["ok"], true);
    }

    #[test]
    fn test_match_key_is_not_serialized() {
        let mut pact = Pact::new("p", "c", "2.0.0");
        pact.append(interaction("https://mock-host/mock-path", "/mock-path", "d"));

        let value = pact.to_json_value().unwrap();
        assert!(value["interactions"][0]["request"].get("url").is_none());
        assert!(value["interactions"][0]["request"].get("headers").is_none());
        // Absent query is omitted rather than serialized as null
        assert!(value["interactions"][0]["request"].get("query").is_none());
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let mut pact = Pact::new("p", "c", "2.0.0");
        for index in 0..5 {
            pact.append(interaction(
                &format!("https://mock-host/{index}"),
                &format!("/{index}"),
                &format!("interaction {index}"),
            ));
        }

        assert_eq!(pact.interactions().len(), 5);
        let value = pact.to_json_value().unwrap();
        let descriptions: Vec<_> = value["interactions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["description"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            descriptions,
            (0..5)
                .map(|index| format!("interaction {index}"))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_interaction_matching_scopes() {
        let configuration = Configuration::new("https", "mock-host").unwrap();
        let request = configuration
            .build(&RequestDescriptor::get("/mock-path").with_header("Accept", "application/json"))
            .unwrap();

        let mut recorded = interaction("https://mock-host/mock-path", "/mock-path", "d");
        assert!(recorded.matches(&request, MatchScope::Url));
        assert!(!recorded.matches(&request, MatchScope::Headers));
        assert!(!recorded.matches(&request, MatchScope::UrlAndHeaders));

        recorded
            .request
            .headers
            .insert("Accept".to_string(), "application/json".to_string());
        assert!(recorded.matches(&request, MatchScope::Headers));
        assert!(recorded.matches(&request, MatchScope::UrlAndHeaders));

        let other = configuration
            .build(&RequestDescriptor::get("/other-path"))
            .unwrap();
        assert!(!recorded.matches(&other, MatchScope::Url));
    }
}
