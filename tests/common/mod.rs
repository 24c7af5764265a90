use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use devconnect_api::auth::TokenService;
use devconnect_api::config::GithubConfig;
use devconnect_api::github::GithubClient;
use devconnect_api::routes::{app, AppState};
use devconnect_api::store::memory::MemoryStore;

/// Build the full router over a fresh in-memory store.
pub fn test_app() -> Router {
    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        tokens: TokenService::new("integration-test-secret", 1).expect("token service"),
        github: GithubClient::new(&GithubConfig {
            api_base: "https://api.github.com".to_string(),
        }),
    };
    app(state)
}

/// Drive one request through the router and decode the JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("x-auth-token", token);
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Like `send`, but with a verbatim body so malformed payloads can be
/// exercised.
#[allow(dead_code)]
pub async fn send_raw(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("x-auth-token", token);
    }
    let request = builder.body(Body::from(body.to_string())).expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Register a user and return their auth token.
pub async fn register(app: &Router, name: &str, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "name": name, "email": email, "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "registration failed: {}", body);
    body["token"].as_str().expect("token").to_string()
}

/// Create a post and return its id.
pub async fn create_post(app: &Router, token: &str, text: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/posts",
        Some(token),
        Some(json!({ "text": text })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "post creation failed: {}", body);
    body["id"].as_str().expect("post id").to_string()
}
