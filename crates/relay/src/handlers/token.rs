use axum::extract::State;
use axum::Json;
use protocol::TokenResponse;

use crate::env::{AZURE_SERVICE_REGION, AZURE_SUBSCRIPTION_KEY};
use crate::error::{preview, ApiError};
use crate::upstream::speech::issue_token;
use crate::upstream::UpstreamError;
use crate::AppState;

pub(crate) async fn issue_speech_token(
    State(state): State<AppState>,
) -> Result<Json<TokenResponse>, ApiError> {
    let subscription_key = state.env.get(AZURE_SUBSCRIPTION_KEY);
    let region = state.env.get(AZURE_SERVICE_REGION);
    let (Some(subscription_key), Some(region)) = (subscription_key, region) else {
        tracing::error!("missing speech subscription key or region in environment");
        return Err(ApiError::ConfigMissing {
            message: "Azure Speech configuration is missing on the server.",
            details: None,
        });
    };

    let url = state.settings.token_url_for(&region);
    match issue_token(&state.http, &url, &subscription_key).await {
        Ok(token) => {
            tracing::info!(region = %region, token_len = token.len(), "speech token issued");
            Ok(Json(TokenResponse { token, region }))
        }
        Err(err) => {
            match &err {
                UpstreamError::Status { status, body } => tracing::error!(
                    region = %region,
                    status = *status,
                    body = %preview(body, 500),
                    "token request failed"
                ),
                _ => tracing::error!(region = %region, error = %err, "token request failed"),
            }
            Err(ApiError::Upstream {
                message: "Failed to obtain Azure Speech token.",
                details: None,
                suggestion: None,
            })
        }
    }
}
