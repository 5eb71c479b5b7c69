//! Exercises the Gemini provider against a local stand-in for the REST API.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use bytes::Bytes;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use summary_service::models::ImageUpload;
use summary_service::services::providers::gemini::{GeminiConfig, GeminiVisionProvider};
use summary_service::services::providers::{ProviderError, VisionProvider};
use summary_service::services::summarizer::SUMMARY_PROMPT;
use tokio::net::TcpListener;

const API_KEY: &str = "fake-gemini-key";

#[derive(Clone, Default)]
struct FakeGemini {
    bodies: Arc<Mutex<Vec<Value>>>,
}

async fn generate(
    State(fake): State<FakeGemini>,
    Path(action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some(API_KEY) {
        return (StatusCode::FORBIDDEN, "bad key").into_response();
    }
    fake.bodies.lock().unwrap().push(body);

    match action.as_str() {
        "gemini-1.5-flash:generateContent" => Json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "**Shape:** A circle.\n\n"}]},
                "finishReason": "STOP"
            }]
        }))
        .into_response(),
        "busy-model:generateContent" => {
            (StatusCode::TOO_MANY_REQUESTS, "quota exceeded").into_response()
        }
        "slow-model:generateContent" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"candidates": []})).into_response()
        }
        _ => (StatusCode::NOT_FOUND, "model not found").into_response(),
    }
}

async fn list(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    match params.get("pageToken").map(String::as_str) {
        None => Json(json!({
            "models": [{
                "name": "models/gemini-1.5-flash",
                "supportedGenerationMethods": ["generateContent", "countTokens"]
            }],
            "nextPageToken": "page-2"
        })),
        Some(_) => Json(json!({
            "models": [{
                "name": "models/embedding-001",
                "supportedGenerationMethods": ["embedContent"]
            }]
        })),
    }
}

async fn spawn_fake() -> (String, FakeGemini) {
    let fake = FakeGemini::default();
    let app = Router::new()
        .route("/v1beta/models", get(list))
        .route("/v1beta/models/:action", post(generate))
        .with_state(fake.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (format!("http://{}/v1beta", addr), fake)
}

fn provider(api_base: String) -> GeminiVisionProvider {
    GeminiVisionProvider::new(GeminiConfig {
        api_key: SecretString::new(API_KEY.to_string()),
        api_base,
        timeout: Duration::from_secs(1),
    })
    .expect("Failed to create provider")
}

fn image() -> ImageUpload {
    ImageUpload::new("board.png", Bytes::from_static(b"\x89PNG\r\n")).unwrap()
}

#[tokio::test]
async fn describe_image_sends_inline_image_and_prompt() {
    let (base, fake) = spawn_fake().await;

    let text = provider(base)
        .describe_image("gemini-1.5-flash", &image(), SUMMARY_PROMPT)
        .await
        .expect("describe_image failed");

    assert_eq!(text, "**Shape:** A circle.\n\n");

    let bodies = fake.bodies.lock().unwrap();
    let parts = &bodies[0]["contents"][0]["parts"];
    assert_eq!(parts[0]["text"], SUMMARY_PROMPT);
    assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
    assert_eq!(
        parts[1]["inlineData"]["data"],
        base64::engine::general_purpose::STANDARD.encode(b"\x89PNG\r\n")
    );
}

#[tokio::test]
async fn rate_limit_maps_to_rate_limited() {
    let (base, _fake) = spawn_fake().await;

    let result = provider(base)
        .describe_image("busy-model", &image(), SUMMARY_PROMPT)
        .await;

    assert!(matches!(result, Err(ProviderError::RateLimited)));
}

#[tokio::test]
async fn unknown_model_maps_to_api_error() {
    let (base, _fake) = spawn_fake().await;

    let result = provider(base)
        .describe_image("models/no-such-model", &image(), SUMMARY_PROMPT)
        .await;

    match result {
        Err(ProviderError::ApiError(message)) => assert!(message.contains("404")),
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn slow_provider_maps_to_timeout() {
    let (base, _fake) = spawn_fake().await;

    let result = provider(base)
        .describe_image("slow-model", &image(), SUMMARY_PROMPT)
        .await;

    assert!(matches!(result, Err(ProviderError::Timeout(_))));
}

#[tokio::test]
async fn list_models_follows_pagination() {
    let (base, _fake) = spawn_fake().await;

    let models = provider(base).list_models().await.expect("list_models failed");

    let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["models/gemini-1.5-flash", "models/embedding-001"]);
    assert!(models[0].supports_generate_content());
    assert!(!models[1].supports_generate_content());
}

#[tokio::test]
async fn unreachable_provider_is_network_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = provider(format!("http://{}/v1beta", addr)).list_models().await;

    assert!(matches!(result, Err(ProviderError::NetworkError(_))));
}
