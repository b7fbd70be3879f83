use axum::extract::State;
use axum::http::header::CACHE_CONTROL;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use protocol::{RewriteRequest, RewriteResponse};
use serde_json::Value;

use crate::config::ServiceSettings;
use crate::env::{DEFAULT_QWEN_API_URL, DEFAULT_QWEN_MODEL, QWEN_API_KEY, QWEN_API_URL, QWEN_MODEL};
use crate::error::{preview, ApiError};
use crate::prompt::system_prompt;
use crate::upstream::chat::{
    send_chat_completion, ChatCompletionRequest, ChatEndpoint, ChatMessage,
};
use crate::upstream::extract::{extract_rewritten, Extracted};
use crate::upstream::UpstreamError;
use crate::AppState;

const REWRITE_FAILED: &str = "Failed to rewrite text on the server.";
const REWRITE_SUGGESTION: &str = "Check Qwen API key and endpoint configuration";

pub(crate) async fn rewrite_text(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let Some(api_key) = state.env.get(QWEN_API_KEY) else {
        tracing::error!("missing rewrite API key in environment");
        return Err(ApiError::ConfigMissing {
            message: "Text rewriting service is not configured on the server.",
            details: Some("QWEN_API_KEY environment variable is missing"),
        });
    };

    let RewriteRequest {
        text,
        relevant_phrases,
    } = parse_request(&body);
    tracing::info!(
        text_preview = %preview(&text, 50),
        text_len = text.chars().count(),
        "rewrite requested"
    );
    if text.trim().is_empty() {
        return Ok(Json(RewriteResponse::unchanged(&text)).into_response());
    }

    let api_url = state.env.get_or(QWEN_API_URL, DEFAULT_QWEN_API_URL);
    let model = state.env.get_or(QWEN_MODEL, DEFAULT_QWEN_MODEL);
    let request = build_chat_request(&state.settings, model, &text, &relevant_phrases);
    let endpoint = ChatEndpoint {
        url: &api_url,
        api_key: &api_key,
        timeout: state.settings.rewrite_timeout,
    };
    tracing::info!(url = %api_url, model = %request.model, "sending rewrite request");

    let raw = send_chat_completion(&state.http, &endpoint, &request)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "rewrite upstream call failed");
            ApiError::Upstream {
                message: REWRITE_FAILED,
                details: Some(upstream_details(&err)),
                suggestion: Some(REWRITE_SUGGESTION),
            }
        })?;

    let parsed: Value = match serde_json::from_str(&raw) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::error!(
                error = %err,
                body = %preview(&raw, 500),
                "rewrite response is not JSON"
            );
            return Err(ApiError::InvalidUpstreamData {
                message: "Text rewriting service returned invalid data.",
                details: "Failed to parse JSON response from Qwen API",
                raw: preview(&raw, 200),
            });
        }
    };

    let rewritten = match extract_rewritten(&parsed) {
        Some(Extracted {
            path,
            text: rewritten,
        }) => {
            tracing::info!(
                path = path,
                rewritten_len = rewritten.chars().count(),
                "rewritten text extracted"
            );
            rewritten
        }
        None => {
            tracing::warn!(
                body = %preview(&parsed.to_string(), 500),
                "unexpected rewrite response layout, returning original text"
            );
            text.clone()
        }
    };

    Ok((
        [(CACHE_CONTROL, "no-cache")],
        Json(RewriteResponse::new(&text, rewritten)),
    )
        .into_response())
}

/// Missing or malformed bodies read as empty text. Each field is read on its
/// own, so a `null` or non-string value only blanks that field.
fn parse_request(body: &[u8]) -> RewriteRequest {
    if body.is_empty() {
        return RewriteRequest::default();
    }
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, "unreadable rewrite request body");
            return RewriteRequest::default();
        }
    };
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    RewriteRequest {
        text: field("text"),
        relevant_phrases: field("relevantPhrases"),
    }
}

fn build_chat_request(
    settings: &ServiceSettings,
    model: String,
    text: &str,
    relevant_phrases: &str,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model,
        messages: vec![
            ChatMessage::system(system_prompt(relevant_phrases)),
            ChatMessage::user(text),
        ],
        temperature: settings.temperature,
        max_tokens: settings.max_tokens,
        stream: false,
    }
}

fn upstream_details(err: &UpstreamError) -> String {
    let mut details = err.to_string();
    if let UpstreamError::Status { body, .. } = err {
        if !body.is_empty() {
            match serde_json::from_str::<Value>(body) {
                Ok(value) => details.push_str(&format!(" | API Error: {value}")),
                Err(_) => details.push_str(&format!(" | Raw Error: {}", preview(body, 200))),
            }
        }
    }
    details
}
