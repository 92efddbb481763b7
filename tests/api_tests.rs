use std::sync::Arc;

use chorus::api::{AppState, ChatResponse, ErrorResponse, router};
use chorus::core::{CredentialStore, Orchestrator, StaticCredentialStore};
use chorus::inference::{CredentialSet, Mode, ProviderName};
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Serves the chat router on an ephemeral port and returns its base URL.
async fn spawn_api(upstream: &MockServer, credentials: CredentialSet, default_mode: Mode) -> String {
    spawn_with_store(
        upstream,
        Arc::new(StaticCredentialStore::new(credentials)),
        default_mode,
    )
    .await
}

async fn spawn_with_store(
    upstream: &MockServer,
    credentials: Arc<dyn CredentialStore>,
    default_mode: Mode,
) -> String {
    let state = AppState {
        orchestrator: Orchestrator::new(
            Some(upstream.uri()),
            Some(upstream.uri()),
            Some(upstream.uri()),
        ),
        credentials,
        default_mode,
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

async fn mount_openai(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": text } }]
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_chat_success() {
    let upstream = MockServer::start().await;
    mount_openai(&upstream, "Hi from GPT").await;
    let base = spawn_api(
        &upstream,
        CredentialSet::new().with(ProviderName::OpenAi, "sk-test"),
        Mode::Combined,
    )
    .await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/chat-ai"))
        .json(&json!({ "content": "Hello", "model": "openai" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: ChatResponse = resp.json().await.unwrap();
    assert_eq!(body.response, "Hi from GPT");
}

#[tokio::test]
async fn test_chat_missing_key_is_500_with_message() {
    let upstream = MockServer::start().await;
    let base = spawn_api(&upstream, CredentialSet::new(), Mode::Combined).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/chat-ai"))
        .json(&json!({ "content": "Hello", "model": "google" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert!(body.error);
    assert_eq!(body.message, "Google API key not configured");
}

#[tokio::test]
async fn test_chat_combined_without_keys() {
    let upstream = MockServer::start().await;
    let base = spawn_api(&upstream, CredentialSet::new(), Mode::Combined).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/chat-ai"))
        .json(&json!({ "content": "Hello", "model": "combined" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(
        body.message,
        "No API keys configured. Please add at least one API key in settings."
    );
}

#[tokio::test]
async fn test_chat_uses_default_mode_when_model_omitted() {
    let upstream = MockServer::start().await;
    mount_openai(&upstream, "defaulted").await;
    let base = spawn_api(
        &upstream,
        CredentialSet::new().with(ProviderName::OpenAi, "sk-test"),
        Mode::Combined,
    )
    .await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/chat-ai"))
        .json(&json!({ "content": "Hello" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: ChatResponse = resp.json().await.unwrap();
    assert_eq!(body.response, "OpenAI: defaulted");
}

#[tokio::test]
async fn test_chat_rejects_malformed_body() {
    let upstream = MockServer::start().await;
    let base = spawn_api(&upstream, CredentialSet::new(), Mode::Combined).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/chat-ai"))
        .json(&json!({ "content": "Hello", "model": "llama" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert!(body.error);
    assert!(!body.message.is_empty());
}

#[tokio::test]
async fn test_chat_looks_up_credentials_per_user() {
    struct PerUser;

    impl CredentialStore for PerUser {
        fn credentials(&self, user_id: &str) -> CredentialSet {
            match user_id {
                "alice" => CredentialSet::new().with(ProviderName::OpenAi, "alice-key"),
                _ => CredentialSet::new(),
            }
        }
    }

    let upstream = MockServer::start().await;
    mount_openai(&upstream, "hello alice").await;
    let base = spawn_with_store(&upstream, Arc::new(PerUser), Mode::OpenAi).await;
    let client = reqwest::Client::new();

    let alice = client
        .post(format!("{base}/chat-ai"))
        .header("x-user-id", "alice")
        .json(&json!({ "content": "Hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(alice.status(), 200);

    let bob = client
        .post(format!("{base}/chat-ai"))
        .header("x-user-id", "bob")
        .json(&json!({ "content": "Hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bob.status(), 500);
    let body: ErrorResponse = bob.json().await.unwrap();
    assert_eq!(body.message, "OpenAI API key not configured");
}

#[tokio::test]
async fn test_cors_preflight() {
    let upstream = MockServer::start().await;
    let base = spawn_api(&upstream, CredentialSet::new(), Mode::Combined).await;

    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{base}/chat-ai"))
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type,apikey")
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
