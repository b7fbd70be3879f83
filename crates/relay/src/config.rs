use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TOKEN_URL: &str =
    "https://{region}.api.cognitive.microsoft.com/sts/v1.0/issueToken";
const DEFAULT_REWRITE_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TEMPERATURE: f32 = 0.1;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub upstream: Option<UpstreamConfig>,
    pub config_endpoint: Option<ConfigEndpointConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// `{region}` is replaced with the configured speech region.
    pub token_url: Option<String>,
    pub rewrite_timeout_ms: Option<u64>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigEndpointConfig {
    pub redact_secrets: Option<bool>,
}

/// Resolved settings shared by every handler.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub token_url: String,
    pub rewrite_timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
    pub redact_secrets: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            rewrite_timeout: Duration::from_millis(DEFAULT_REWRITE_TIMEOUT_MS),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            redact_secrets: false,
        }
    }
}

impl ServiceSettings {
    pub fn token_url_for(&self, region: &str) -> String {
        self.token_url.replace("{region}", region)
    }
}

pub fn resolve_settings(config: ServiceConfig) -> anyhow::Result<ServiceSettings> {
    let upstream = config.upstream.unwrap_or_default();
    let endpoint = config.config_endpoint.unwrap_or_default();
    let defaults = ServiceSettings::default();

    let token_url = upstream.token_url.unwrap_or(defaults.token_url);
    if token_url.trim().is_empty() {
        anyhow::bail!("upstream.token_url cannot be empty");
    }
    let timeout_ms = upstream
        .rewrite_timeout_ms
        .unwrap_or(DEFAULT_REWRITE_TIMEOUT_MS);
    if timeout_ms == 0 {
        anyhow::bail!("upstream.rewrite_timeout_ms must be greater than zero");
    }
    let max_tokens = upstream.max_tokens.unwrap_or(defaults.max_tokens);
    if max_tokens == 0 {
        anyhow::bail!("upstream.max_tokens must be greater than zero");
    }
    let temperature = upstream.temperature.unwrap_or(defaults.temperature);
    if !(0.0..=2.0).contains(&temperature) {
        anyhow::bail!("upstream.temperature must be within 0.0..=2.0");
    }

    Ok(ServiceSettings {
        token_url,
        rewrite_timeout: Duration::from_millis(timeout_ms),
        max_tokens,
        temperature,
        redact_secrets: endpoint.redact_secrets.unwrap_or(defaults.redact_secrets),
    })
}

pub fn load_service_settings(path: Option<&Path>) -> anyhow::Result<ServiceSettings> {
    let Some(path) = path else {
        return Ok(ServiceSettings::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: ServiceConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    resolve_settings(config).with_context(|| format!("invalid config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_path_means_defaults() {
        let settings = load_service_settings(None).expect("settings");
        assert_eq!(settings.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(settings.rewrite_timeout, Duration::from_secs(30));
        assert_eq!(settings.max_tokens, 1000);
        assert!(!settings.redact_secrets);
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let input = r#"
[upstream]
rewrite_timeout_ms = 5000

[config_endpoint]
redact_secrets = true
"#;
        let config: ServiceConfig = toml::from_str(input).expect("parse");
        let settings = resolve_settings(config).expect("settings");
        assert_eq!(settings.rewrite_timeout, Duration::from_secs(5));
        assert_eq!(settings.token_url, DEFAULT_TOKEN_URL);
        assert!((settings.temperature - 0.1).abs() < f32::EPSILON);
        assert!(settings.redact_secrets);
    }

    #[test]
    fn rejects_zero_timeout() {
        let config: ServiceConfig =
            toml::from_str("[upstream]\nrewrite_timeout_ms = 0\n").expect("parse");
        let err = resolve_settings(config)
            .err()
            .expect("expected error")
            .to_string();
        assert!(err.contains("rewrite_timeout_ms"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let result: Result<ServiceConfig, _> = toml::from_str("[upstream]\nretries = 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn token_url_substitutes_region() {
        let settings = ServiceSettings::default();
        assert_eq!(
            settings.token_url_for("westus2"),
            "https://westus2.api.cognitive.microsoft.com/sts/v1.0/issueToken"
        );
    }
}
