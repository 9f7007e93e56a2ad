// HTTP contract tests for the extraction client against a local mock server.

use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use parceltrack_core::{Carrier, PackageStatus};
use parceltrack_extract::{ApiFlavor, ClientConfig, ExtractClient, ExtractError, Extractor};

fn client(server: &MockServer, flavor: ApiFlavor) -> ExtractClient {
    ExtractClient::new(ClientConfig {
        flavor,
        endpoint: server.base_url(),
        model: "test-model".into(),
        api_key: "secret-key".into(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
}

#[test]
fn gemini_text_extraction() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/models/test-model:generateContent")
            .header("x-goog-api-key", "secret-key");
        then.status(200).json_body(gemini_reply(
            r#"{"trackingNumber":"TNT123","carrier":"GLS","sender":"ACME","status":"READY_FOR_PICKUP"}"#,
        ));
    });

    let result = client(&server, ApiFlavor::Gemini)
        .extract_from_text("Your GLS parcel TNT123 from ACME is ready")
        .unwrap();

    mock.assert();
    assert_eq!(result.tracking_number.as_deref(), Some("TNT123"));
    assert_eq!(result.carrier, Carrier::Gls);
    assert_eq!(result.sender.as_deref(), Some("ACME"));
    assert_eq!(result.status, PackageStatus::ReadyForPickup);
}

#[test]
fn gemini_image_extraction() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/models/test-model:generateContent");
        then.status(200)
            .json_body(gemini_reply(r#"{"trackingNumber":"PN-77","carrier":"PostNord"}"#));
    });

    let result = client(&server, ApiFlavor::Gemini)
        .extract_from_image(b"\x89PNG fake", "image/png")
        .unwrap();

    mock.assert();
    assert_eq!(result.tracking_number.as_deref(), Some("PN-77"));
    assert_eq!(result.status, PackageStatus::InTransit);
}

#[test]
fn openai_text_extraction() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .header("authorization", "Bearer secret-key");
        then.status(200).json_body(json!({
            "choices": [{ "message": { "role": "assistant",
                "content": "```json\n{\"trackingNumber\": \"1Z999\", \"carrier\": \"UPS\", \"sender\": null}\n```" } }]
        }));
    });

    let result = client(&server, ApiFlavor::OpenAI)
        .extract_from_text("UPS: 1Z999 is on its way")
        .unwrap();

    mock.assert();
    assert_eq!(result.tracking_number.as_deref(), Some("1Z999"));
    assert_eq!(result.carrier, Carrier::Ups);
    assert!(result.sender.is_none());
}

#[test]
fn http_error_is_reported_with_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(401).body("invalid api key");
    });

    let err = client(&server, ApiFlavor::OpenAI)
        .extract_from_text("anything")
        .unwrap_err();
    match err {
        ExtractError::Http(code, body) => {
            assert_eq!(code, 401);
            assert!(body.contains("invalid api key"));
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[test]
fn null_reply_is_no_data() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/models/test-model:generateContent");
        then.status(200).json_body(gemini_reply("null"));
    });

    let err = client(&server, ApiFlavor::Gemini)
        .extract_from_text("Happy birthday!")
        .unwrap_err();
    assert!(matches!(err, ExtractError::NoData));
}

#[test]
fn non_json_body_is_parse_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/models/test-model:generateContent");
        then.status(200).body("<html>gateway</html>");
    });

    let err = client(&server, ApiFlavor::Gemini)
        .extract_from_text("text")
        .unwrap_err();
    assert!(matches!(err, ExtractError::Parse(_)));
}
