// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! VisionAnalyzer tests against a local OpenAI-compatible stub server
//!
//! The stub records each chat request so the tests can check what goes over
//! the wire: one user message with the rubric text and an inline JPEG.

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use ball_qc::vision::{
    preprocess, FrameAnalyzer, InferenceService, PreprocessConfig, RawImage, ServiceError,
    VerdictStatus, VisionAnalyzer, VlmClient, VlmConfig, FALLBACK_MESSAGE, RUBRIC_PROMPT,
};
use image::{DynamicImage, ImageFormat};
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// (authorization header, request body) per call
type RequestLog = Arc<Mutex<Vec<(Option<String>, Value)>>>;

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: Value,
    seen: RequestLog,
}

async fn chat_completions(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    stub.seen.lock().unwrap().push((auth, body));
    (stub.status, Json(stub.body.clone()))
}

/// Start a stub on an ephemeral port; returns its base URL and request log
async fn spawn_stub(status: StatusCode, body: Value) -> (String, RequestLog) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        status,
        body,
        seen: seen.clone(),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), seen)
}

fn reply(text: &str) -> Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": text}}],
        "usage": {"total_tokens": 42}
    })
}

fn analyzer_for(endpoint: &str, api_key: Option<&str>) -> VisionAnalyzer {
    let client = VlmClient::new(VlmConfig {
        endpoint: endpoint.to_string(),
        model_name: "test-vlm".to_string(),
        api_key: api_key.map(str::to_string),
        timeout_secs: 5,
        max_tokens: 300,
    })
    .unwrap();
    VisionAnalyzer::new(Arc::new(client))
}

fn photo(width: u32, height: u32) -> RawImage {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    RawImage::decode(buffer.into_inner()).unwrap()
}

#[tokio::test]
async fn test_request_carries_rubric_and_inline_jpeg() {
    let (endpoint, seen) =
        spawn_stub(StatusCode::OK, reply("STATUS: PASS\nREASON: Flawless finish.")).await;
    let analyzer = analyzer_for(&endpoint, Some("sk-test"));

    let frame = preprocess(&photo(1600, 1200), &PreprocessConfig::default()).unwrap();
    let expected_url = frame.to_data_url();
    let verdict = analyzer.analyze(frame).await.unwrap();

    assert_eq!(verdict.status, VerdictStatus::Pass);
    assert_eq!(verdict.message, "Flawless finish.");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1, "exactly one inference call per analysis");
    let (auth, body) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(body["model"], "test-vlm");
    assert_eq!(body["max_tokens"], 300);

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");

    let parts = messages[0]["content"].as_array().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0]["type"], "text");
    assert_eq!(parts[0]["text"], RUBRIC_PROMPT);
    assert_eq!(parts[1]["type"], "image_url");

    let url = parts[1]["image_url"]["url"].as_str().unwrap();
    assert!(url.starts_with("data:image/jpeg;base64,"));
    assert_eq!(url, expected_url);
}

#[tokio::test]
async fn test_no_auth_header_without_key() {
    let (endpoint, seen) =
        spawn_stub(StatusCode::OK, reply("STATUS: NO_BALL\nREASON: Empty frame.")).await;
    let analyzer = analyzer_for(&endpoint, None);

    let frame = preprocess(&photo(64, 64), &PreprocessConfig::default()).unwrap();
    let verdict = analyzer.analyze(frame).await.unwrap();

    assert_eq!(verdict.status, VerdictStatus::NoBall);
    assert_eq!(seen.lock().unwrap()[0].0, None);
}

#[tokio::test]
async fn test_unparseable_reply_becomes_quality_error() {
    let (endpoint, _) = spawn_stub(StatusCode::OK, reply("What a lovely ornament!")).await;
    let analyzer = analyzer_for(&endpoint, None);

    let frame = preprocess(&photo(64, 64), &PreprocessConfig::default()).unwrap();
    let verdict = analyzer.analyze(frame).await.unwrap();

    assert_eq!(verdict.status, VerdictStatus::QualityError);
    assert_eq!(verdict.message, FALLBACK_MESSAGE);
}

#[tokio::test]
async fn test_upstream_error_message_surfaced() {
    let (endpoint, _) = spawn_stub(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"error": {"message": "Rate limit reached", "type": "requests"}}),
    )
    .await;
    let analyzer = analyzer_for(&endpoint, None);

    let frame = preprocess(&photo(64, 64), &PreprocessConfig::default()).unwrap();
    let err = analyzer.analyze(frame).await.unwrap_err();

    match err {
        ServiceError::Api { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "Rate limit reached");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_choice_is_empty_reply() {
    let (endpoint, _) = spawn_stub(
        StatusCode::OK,
        json!({"choices": [{"message": {"role": "assistant", "content": null}}]}),
    )
    .await;
    let analyzer = analyzer_for(&endpoint, None);

    let frame = preprocess(&photo(64, 64), &PreprocessConfig::default()).unwrap();
    let err = analyzer.analyze(frame).await.unwrap_err();
    assert!(matches!(err, ServiceError::EmptyReply), "got {:?}", err);
}

#[tokio::test]
async fn test_garbage_body_is_invalid_response() {
    let (endpoint, _) = spawn_stub(StatusCode::OK, json!({"unexpected": true})).await;
    let analyzer = analyzer_for(&endpoint, None);

    let frame = preprocess(&photo(64, 64), &PreprocessConfig::default()).unwrap();
    let err = analyzer.analyze(frame).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidResponse(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_health_check_fails_without_models_route() {
    let (endpoint, _) = spawn_stub(StatusCode::OK, reply("unused")).await;
    let client = VlmClient::new(VlmConfig {
        endpoint: format!("{}/", endpoint),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(client.endpoint(), endpoint);
    assert!(!client.health_check().await);
}
