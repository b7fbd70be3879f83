pub mod cli;
pub mod config;
pub mod env;
mod error;
mod handlers;
pub mod logging;
mod prompt;
#[cfg(test)]
mod test_utils;
mod upstream;

use anyhow::Context;
use axum::body::Body;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ServiceSettings;
use crate::env::EnvSource;

/// Per-process state handed to every handler. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub(crate) env: Arc<dyn EnvSource>,
    pub(crate) settings: Arc<ServiceSettings>,
    pub(crate) http: reqwest::Client,
}

impl AppState {
    pub fn new(env: Arc<dyn EnvSource>, settings: ServiceSettings) -> anyhow::Result<Self> {
        let http = upstream::build_http_client().context("failed to build http client")?;
        Ok(Self {
            env,
            settings: Arc::new(settings),
            http,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(protocol::CONFIG_PATH, get(handlers::get_config))
        .route(
            protocol::SPEECH_TOKEN_PATH,
            post(handlers::issue_speech_token),
        )
        .route(protocol::REWRITE_PATH, post(handlers::rewrite_text))
        .with_state(state)
        .layer(middleware::from_fn(log_http_request))
}

async fn health() -> &'static str {
    "ok"
}

async fn log_http_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let span = tracing::info_span!("http", request_id = %Uuid::new_v4());
    let started = Instant::now();
    let response = next.run(req).instrument(span.clone()).await;
    let status = response.status();
    span.in_scope(|| {
        tracing::info!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "http request"
        )
    });
    response
}
