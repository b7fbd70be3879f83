use serde::{Deserialize, Serialize};

pub const CONFIG_PATH: &str = "/api/config";
pub const SPEECH_TOKEN_PATH: &str = "/api/get-speech-token";
pub const REWRITE_PATH: &str = "/api/rewrite-text";

/// Non-secret (and, unless redacted, secret) settings handed to the browser.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default)]
    pub azure_subscription_key: String,
    #[serde(default)]
    pub azure_service_region: String,
    #[serde(default)]
    pub azure_custom_endpoint_id: String,
    #[serde(default)]
    pub qwen_api_key: String,
    #[serde(default)]
    pub qwen_api_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub token: String,
    pub region: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RewriteRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub relevant_phrases: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResponse {
    pub rewritten_text: String,
    #[serde(default)]
    pub original_length: usize,
    #[serde(default)]
    pub rewritten_length: usize,
}

impl RewriteResponse {
    pub fn new(original: &str, rewritten: impl Into<String>) -> Self {
        let rewritten_text = rewritten.into();
        Self {
            original_length: original.chars().count(),
            rewritten_length: rewritten_text.chars().count(),
            rewritten_text,
        }
    }

    pub fn unchanged(original: &str) -> Self {
        Self::new(original, original)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            suggestion: None,
            raw_response: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_raw_response(mut self, raw: impl Into<String>) -> Self {
        self.raw_response = Some(raw.into());
        self
    }
}
