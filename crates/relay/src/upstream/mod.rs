pub(crate) mod chat;
pub(crate) mod extract;
pub(crate) mod speech;

use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;

pub(crate) const USER_AGENT: &str = concat!("scribe-relay/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub(crate) enum UpstreamError {
    Transport(String),
    Timeout(Duration),
    Status { status: u16, body: String },
}

impl UpstreamError {
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Option<Duration>) -> Self {
        match timeout {
            Some(timeout) if err.is_timeout() => Self::Timeout(timeout),
            _ => Self::Transport(err.to_string()),
        }
    }
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "Request failed: {err}"),
            Self::Timeout(timeout) => {
                write!(f, "Request timeout after {} seconds", timeout.as_secs())
            }
            Self::Status { status, .. } => write!(f, "Upstream failed with status {status}"),
        }
    }
}

impl std::error::Error for UpstreamError {}

/// Shared by all handlers. Redirects are not followed.
pub(crate) fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .redirect(Policy::none())
        .user_agent(USER_AGENT)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_reports_whole_seconds() {
        let err = UpstreamError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Request timeout after 30 seconds");
    }

    #[test]
    fn status_message_omits_body() {
        let err = UpstreamError::Status {
            status: 429,
            body: "slow down".to_string(),
        };
        assert_eq!(err.to_string(), "Upstream failed with status 429");
    }
}
