//! Contract recording round-trips
//!
//! Verifies that a recorder fed N interactions produces a broker-compatible
//! document with N entries in call order, and that the same recorder can
//! stub session responses while recording.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tokio::sync::oneshot;
use url::Url;

use courier_core::{
    Configuration, HttpMethod, PactNetworkClient, PactRecorder, RequestDescriptor,
    StubbedInteractions,
};

fn recorder() -> PactRecorder {
    PactRecorder::new(
        Url::parse("https://mock-host").unwrap(),
        "2.0.0",
        "timezone-service",
        "timezone-app",
    )
}

#[test]
fn test_recorder_round_trip_preserves_inputs_and_order() {
    let recorder = recorder();

    let inputs = [
        ("zones exist", "list zones", "/zones", 200),
        ("zone 42 exists", "get one zone", "/zones/42", 200),
        ("no zones", "list zones when empty", "/zones", 404),
    ];
    for (provider_state, description, path, status) in inputs {
        recorder
            .add_interaction(
                provider_state,
                description,
                HttpMethod::Get,
                path,
                &BTreeMap::new(),
                status,
                Some(json!({"path": path})),
            )
            .unwrap();
    }

    let document = recorder.pact().to_json_value().unwrap();

    assert_eq!(document["provider"]["name"], "timezone-service");
    assert_eq!(document["consumer"]["name"], "timezone-app");
    assert_eq!(document["metadata"]["pactSpecification"]["version"], "2.0.0");

    let interactions = document["interactions"].as_array().unwrap();
    assert_eq!(interactions.len(), inputs.len());
    for (entry, (provider_state, description, path, status)) in interactions.iter().zip(inputs) {
        assert_eq!(entry["provider_state"], provider_state);
        assert_eq!(entry["description"], description);
        assert_eq!(entry["request"]["method"], "GET");
        assert_eq!(entry["request"]["path"], path);
        assert_eq!(entry["response"]["status"], status);
        assert_eq!(entry["response"]["body"]["path"], path);
    }
}

#[test]
fn test_contract_document_written_to_disk() {
    let recorder = recorder();
    let mut parameters = BTreeMap::new();
    parameters.insert("country".to_string(), "GB".to_string());

    recorder
        .add_interaction(
            "zones exist",
            "list zones for country",
            HttpMethod::Get,
            "/zones",
            &parameters,
            200,
            Some(json!({"zones": []})),
        )
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timezone-app-timezone-service.json");
    recorder.write_to(&path).unwrap();

    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["consumer"]["name"], "timezone-app");
    assert_eq!(
        written["interactions"][0]["request"]["query"],
        "country=GB"
    );
}

#[tokio::test]
async fn test_pact_client_stubs_while_recording() {
    let configuration = Configuration::new("https", "mock-host").unwrap();
    let client = PactNetworkClient::new(configuration, recorder());

    client
        .add_stubbed_interaction(
            "zones exist",
            "list zones",
            HttpMethod::Get,
            "/zones",
            &BTreeMap::new(),
            200,
            Some(json!({"zones": [{"countryCode": "UK"}]})),
        )
        .unwrap();

    let (tx, rx) = oneshot::channel();
    let session = client.session(RequestDescriptor::get("/zones"), move |outcome| {
        let _ = tx.send(outcome);
    });
    session.start().unwrap();

    let outcome = rx.await.unwrap();
    assert!(outcome.error.is_none());
    assert_eq!(
        outcome.body.unwrap()["zones"][0]["countryCode"],
        Value::from("UK")
    );

    // The stubbed exchange is part of the contract
    let document = client.pact().to_json_value().unwrap();
    assert_eq!(document["interactions"].as_array().unwrap().len(), 1);
    assert_eq!(document["interactions"][0]["description"], "list zones");
}

#[tokio::test]
async fn test_interactions_can_be_added_while_sessions_run() {
    let configuration = Configuration::new("https", "mock-host").unwrap();
    let client = PactNetworkClient::new(configuration, recorder());

    client
        .add_stubbed_interaction(
            "zones exist",
            "list zones",
            HttpMethod::Get,
            "/zones",
            &BTreeMap::new(),
            200,
            Some(json!({"zones": []})),
        )
        .unwrap();

    let (tx, rx) = oneshot::channel();
    let session = client.session(RequestDescriptor::get("/zones"), move |outcome| {
        let _ = tx.send(outcome);
    });
    session.start().unwrap();

    // Registration from test-setup code while a request is in flight
    client
        .add_stubbed_interaction(
            "zone 42 exists",
            "get one zone",
            HttpMethod::Get,
            "/zones/42",
            &BTreeMap::new(),
            200,
            None,
        )
        .unwrap();

    let outcome = rx.await.unwrap();
    assert!(outcome.error.is_none());
    assert_eq!(client.recorder().interaction_count(), 2);
}
