use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use solace_relay::{
    relay::Relay,
    server::{AppState, router},
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // for `oneshot`

use super::mocks::StubLlmClient;

/// Build the full router around a relay backed by `stub`.
pub fn create_test_app(stub: &StubLlmClient) -> Router {
    create_app_with_relay(Relay::new(Some(Arc::new(stub.clone()))))
}

/// Same as [`create_test_app`] with a short provider timeout.
pub fn create_test_app_with_timeout(stub: &StubLlmClient, timeout: Duration) -> Router {
    create_app_with_relay(Relay::new(Some(Arc::new(stub.clone()))).with_timeout(timeout))
}

pub fn create_app_with_relay(relay: Relay) -> Router {
    router(AppState {
        relay: Arc::new(relay),
    })
}

pub fn chat_request(body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

pub fn health_request() -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap()
}

/// Send `request` and return the status with the JSON body.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);
    (status, body)
}
