use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use protocol::ErrorBody;

/// Failures a handler reports to the caller. Every variant maps to HTTP 500;
/// the distinction only shapes the body.
#[derive(Debug)]
pub(crate) enum ApiError {
    ConfigMissing {
        message: &'static str,
        details: Option<&'static str>,
    },
    Upstream {
        message: &'static str,
        details: Option<String>,
        suggestion: Option<&'static str>,
    },
    InvalidUpstreamData {
        message: &'static str,
        details: &'static str,
        raw: String,
    },
}

impl ApiError {
    fn body(&self) -> ErrorBody {
        match self {
            Self::ConfigMissing { message, details } => {
                let body = ErrorBody::new(*message);
                match details {
                    Some(details) => body.with_details(*details),
                    None => body,
                }
            }
            Self::Upstream {
                message,
                details,
                suggestion,
            } => {
                let mut body = ErrorBody::new(*message);
                if let Some(details) = details {
                    body = body.with_details(details.clone());
                }
                if let Some(suggestion) = suggestion {
                    body = body.with_suggestion(*suggestion);
                }
                body
            }
            Self::InvalidUpstreamData {
                message,
                details,
                raw,
            } => ErrorBody::new(*message)
                .with_details(*details)
                .with_raw_response(raw.clone()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigMissing { message, .. } => write!(f, "configuration missing: {message}"),
            Self::Upstream {
                message, details, ..
            } => match details {
                Some(details) => write!(f, "{message} ({details})"),
                None => write!(f, "{message}"),
            },
            Self::InvalidUpstreamData { message, .. } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self.body())).into_response()
    }
}

/// First `limit` characters of an upstream payload, for diagnostics.
pub(crate) fn preview(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
