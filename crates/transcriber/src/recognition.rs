use async_trait::async_trait;
use protocol::{ClientConfig, TokenResponse};

/// Language for which the trained custom endpoint exists.
pub const SIMPLIFIED_CHINESE: &str = "zh-CN";

pub fn custom_model_available(language: &str) -> bool {
    language == SIMPLIFIED_CHINESE
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionEvent {
    pub text: String,
    pub is_final: bool,
}

impl RecognitionEvent {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechCredential {
    SubscriptionKey(String),
    AuthorizationToken(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSettings {
    pub credential: SpeechCredential,
    pub region: String,
    pub language: String,
    /// Custom endpoint id; only set for languages with a trained model.
    pub endpoint_id: Option<String>,
}

impl RecognitionSettings {
    pub fn from_subscription(config: &ClientConfig, language: &str, use_custom_model: bool) -> Self {
        Self {
            credential: SpeechCredential::SubscriptionKey(config.azure_subscription_key.clone()),
            region: config.azure_service_region.clone(),
            language: language.to_string(),
            endpoint_id: endpoint_for(config, language, use_custom_model),
        }
    }

    pub fn from_token(
        token: TokenResponse,
        config: &ClientConfig,
        language: &str,
        use_custom_model: bool,
    ) -> Self {
        Self {
            credential: SpeechCredential::AuthorizationToken(token.token),
            region: token.region,
            language: language.to_string(),
            endpoint_id: endpoint_for(config, language, use_custom_model),
        }
    }

    pub fn uses_custom_model(&self) -> bool {
        self.endpoint_id.is_some()
    }
}

fn endpoint_for(config: &ClientConfig, language: &str, use_custom_model: bool) -> Option<String> {
    let endpoint = config.azure_custom_endpoint_id.trim();
    (use_custom_model && custom_model_available(language) && !endpoint.is_empty())
        .then(|| endpoint.to_string())
}

/// A speech recognition session supplied by a vendor SDK.
///
/// Events come out lazily through [`Recognizer::next_event`]. After
/// [`Recognizer::stop`] the recognizer may be started again with new settings.
#[async_trait]
pub trait Recognizer: Send {
    async fn start(&mut self, settings: &RecognitionSettings) -> anyhow::Result<()>;

    /// `Ok(None)` once the session has ended on its own. An error means the
    /// SDK canceled recognition.
    async fn next_event(&mut self) -> anyhow::Result<Option<RecognitionEvent>>;

    /// Flushes pending audio and releases the session.
    async fn stop(&mut self) -> anyhow::Result<()>;
}
