use axum::extract::State;
use axum::Json;
use protocol::ClientConfig;

use crate::env::{
    AZURE_CUSTOM_ENDPOINT_ID, AZURE_SERVICE_REGION, AZURE_SUBSCRIPTION_KEY,
    DEFAULT_QWEN_API_URL, DEFAULT_SERVICE_REGION, QWEN_API_KEY, QWEN_API_URL,
};
use crate::AppState;

pub(crate) async fn get_config(State(state): State<AppState>) -> Json<ClientConfig> {
    let env = state.env.as_ref();
    let mut config = ClientConfig {
        azure_subscription_key: env.get_or(AZURE_SUBSCRIPTION_KEY, ""),
        azure_service_region: env.get_or(AZURE_SERVICE_REGION, DEFAULT_SERVICE_REGION),
        azure_custom_endpoint_id: env.get_or(AZURE_CUSTOM_ENDPOINT_ID, ""),
        qwen_api_key: env.get_or(QWEN_API_KEY, ""),
        qwen_api_url: env.get_or(QWEN_API_URL, DEFAULT_QWEN_API_URL),
    };
    if state.settings.redact_secrets {
        config.azure_subscription_key.clear();
        config.qwen_api_key.clear();
    }
    tracing::debug!(
        region = %config.azure_service_region,
        subscription_key_set = !config.azure_subscription_key.is_empty(),
        custom_endpoint_set = !config.azure_custom_endpoint_id.is_empty(),
        redacted = state.settings.redact_secrets,
        "config served"
    );
    Json(config)
}
