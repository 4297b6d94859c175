use drawing2ai::remote::{Describer, DescriptionClient, RemoteApiError};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

fn client(server: &MockServer) -> DescriptionClient {
    DescriptionClient::new(
        server.url("/v1/chat/completions"),
        "sk-test",
        "gpt-4o-mini",
        20,
        Some(Duration::from_secs(5)),
    )
    .unwrap()
}

#[test]
fn posts_jpeg_data_uri_with_bearer_auth() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("authorization", "Bearer sk-test")
            .json_body_partial(r#"{ "model": "gpt-4o-mini", "max_tokens": 20 }"#)
            .body_contains("data:image/jpeg;base64,")
            .body_contains(r#""detail":"low""#);
        then.status(200).json_body(json!({
            "choices": [
                { "message": { "role": "assistant", "content": " a small brown dog, sitting, facing left \n" } }
            ]
        }));
    });

    let text = client(&server).describe(b"\xFF\xD8\xFFfake").unwrap();
    mock.assert();
    assert_eq!(text, "a small brown dog, sitting, facing left");
}

#[test]
fn server_error_surfaces_status_and_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(500).body("upstream exploded");
    });

    let err = client(&server).describe(b"jpeg").unwrap_err();
    match err {
        RemoteApiError::Status { status, body, .. } => {
            assert_eq!(status, 500);
            assert!(body.contains("upstream exploded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn malformed_json_is_a_decode_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .header("content-type", "application/json")
            .body("{ not json");
    });

    let err = client(&server).describe(b"jpeg").unwrap_err();
    assert!(matches!(err, RemoteApiError::Decode { .. }), "{err:?}");
    assert_eq!(err.service(), "openai");
}

#[test]
fn missing_choices_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(json!({ "choices": [] }));
    });

    let err = client(&server).describe(b"jpeg").unwrap_err();
    assert!(matches!(err, RemoteApiError::MissingField { .. }), "{err:?}");
}
