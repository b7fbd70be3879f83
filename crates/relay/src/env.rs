use std::collections::HashMap;

pub const AZURE_SUBSCRIPTION_KEY: &str = "AZURE_SUBSCRIPTION_KEY";
pub const AZURE_SERVICE_REGION: &str = "AZURE_SERVICE_REGION";
pub const AZURE_CUSTOM_ENDPOINT_ID: &str = "AZURE_CUSTOM_ENDPOINT_ID";
pub const QWEN_API_KEY: &str = "QWEN_API_KEY";
pub const QWEN_API_URL: &str = "QWEN_API_URL";
pub const QWEN_MODEL: &str = "QWEN_MODEL";

pub const DEFAULT_SERVICE_REGION: &str = "eastus";
pub const DEFAULT_QWEN_API_URL: &str =
    "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions";
pub const DEFAULT_QWEN_MODEL: &str = "qwen-max";

/// Where handlers read their settings from. Values are looked up on every
/// request, so rotating a key does not need a restart.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;

    /// Empty values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        self.var(key).filter(|value| !value.is_empty())
    }

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}

pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of values, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    values: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
