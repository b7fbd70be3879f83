use anyhow::Context;
use protocol::{
    ClientConfig, RewriteRequest, TokenResponse, CONFIG_PATH, REWRITE_PATH, SPEECH_TOKEN_PATH,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// HTTP client for the relay's three endpoints.
#[derive(Debug, Clone)]
pub struct RelayClient {
    base_url: String,
    http: Client,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            anyhow::bail!("relay base url is empty");
        }
        let http = Client::builder()
            .build()
            .context("failed to build http client")?;
        Ok(Self { base_url, http })
    }

    fn url(&self, path: &str) -> String {
        join_base_path(&self.base_url, path)
    }

    pub async fn fetch_config(&self) -> anyhow::Result<ClientConfig> {
        let response = self
            .http
            .get(self.url(CONFIG_PATH))
            .send()
            .await
            .context("config request failed")?;
        read_json(response, "config").await
    }

    pub async fn fetch_token(&self) -> anyhow::Result<TokenResponse> {
        let response = self
            .http
            .post(self.url(SPEECH_TOKEN_PATH))
            .send()
            .await
            .context("token request failed")?;
        read_json(response, "token").await
    }

    /// Rewrites one finalized segment. Blank text is returned as is without a
    /// request; a success body without `rewrittenText` also yields the input.
    pub async fn rewrite(&self, text: &str, relevant_phrases: &str) -> anyhow::Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        let request = RewriteRequest {
            text: text.to_string(),
            relevant_phrases: relevant_phrases.to_string(),
        };
        let response = self
            .http
            .post(self.url(REWRITE_PATH))
            .json(&request)
            .send()
            .await
            .context("rewrite request failed")?;
        let body: Value = read_json(response, "rewrite").await?;
        match body.get("rewrittenText").and_then(Value::as_str) {
            Some(rewritten) => Ok(rewritten.to_string()),
            None => {
                tracing::warn!(body = %body, "unexpected rewrite response");
                Ok(text.to_string())
            }
        }
    }
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> anyhow::Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("{what} endpoint returned {status}: {body}");
    }
    response
        .json()
        .await
        .with_context(|| format!("failed to decode {what} response"))
}

fn join_base_path(base: &str, path: &str) -> String {
    let normalized_base = base.trim_end_matches('/');
    let normalized_path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    format!("{normalized_base}{normalized_path}")
}
