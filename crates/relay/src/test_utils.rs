use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::ServiceSettings;
use crate::env::MapEnv;
use crate::{router, AppState};

pub(crate) struct TestResponse {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Value,
}

pub(crate) fn test_state(env: MapEnv, settings: ServiceSettings) -> AppState {
    AppState::new(Arc::new(env), settings).expect("state")
}

async fn send(state: AppState, request: Request<Body>) -> TestResponse {
    let response = router(state).oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

pub(crate) async fn get(state: AppState, path: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("request");
    let response = send(state, request).await;
    (response.status, response.body)
}

pub(crate) async fn post_raw(state: AppState, path: &str, body: &str) -> TestResponse {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    send(state, request).await
}

pub(crate) async fn post_json(state: AppState, path: &str, body: &Value) -> TestResponse {
    post_raw(state, path, &body.to_string()).await
}
