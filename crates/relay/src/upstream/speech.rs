use reqwest::header::CONTENT_LENGTH;
use reqwest::Client;

use super::UpstreamError;

pub(crate) const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Exchanges the subscription key for a short-lived bearer token. The token
/// is the raw response body.
pub(crate) async fn issue_token(
    client: &Client,
    url: &str,
    subscription_key: &str,
) -> Result<String, UpstreamError> {
    let response = client
        .post(url)
        .header(SUBSCRIPTION_KEY_HEADER, subscription_key)
        .header(CONTENT_LENGTH, "0")
        .body(Vec::new())
        .send()
        .await
        .map_err(|err| UpstreamError::from_reqwest(err, None))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| UpstreamError::from_reqwest(err, None))?;
    if !status.is_success() {
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}
