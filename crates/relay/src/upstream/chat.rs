use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::UpstreamError;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatMessage {
    pub(crate) role: String,
    pub(crate) content: String,
}

impl ChatMessage {
    pub(crate) fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub(crate) fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// OpenAI-compatible, non-streaming chat completion body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub(crate) model: String,
    pub(crate) messages: Vec<ChatMessage>,
    pub(crate) temperature: f32,
    pub(crate) max_tokens: u32,
    pub(crate) stream: bool,
}

pub(crate) struct ChatEndpoint<'a> {
    pub(crate) url: &'a str,
    pub(crate) api_key: &'a str,
    pub(crate) timeout: Duration,
}

/// Sends exactly one request and returns the raw 2xx body. The caller decides
/// how to interpret it.
pub(crate) async fn send_chat_completion(
    client: &Client,
    endpoint: &ChatEndpoint<'_>,
    request: &ChatCompletionRequest,
) -> Result<String, UpstreamError> {
    let timeout = Some(endpoint.timeout);
    let response = client
        .post(endpoint.url)
        .header(AUTHORIZATION, format!("Bearer {}", endpoint.api_key))
        .header(ACCEPT, "application/json")
        .timeout(endpoint.timeout)
        .json(request)
        .send()
        .await
        .map_err(|err| UpstreamError::from_reqwest(err, timeout))?;
    let status = response.status();
    tracing::info!(status = %status, "chat completion responded");
    let body = response
        .text()
        .await
        .map_err(|err| UpstreamError::from_reqwest(err, timeout))?;
    tracing::debug!(body_len = body.len(), "chat completion body received");
    if !status.is_success() {
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}
