//! Upstream relay configuration.

use std::{borrow::Cow, time::Duration};

use duration_str::deserialize_option_duration;
use secrecy::SecretString;
use serde::Deserialize;

/// Default OpenAI-compatible completion API the relay talks to.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Model attached to every forwarded conversation unless configured otherwise.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Configuration of the chat relay and its upstream completion API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    /// The path where the relay endpoints are mounted.
    pub path: Cow<'static, str>,
    /// Base URL of the upstream API. `/chat/completions` is appended to it.
    pub base_url: String,
    /// The model name sent upstream with every conversation.
    pub model: String,
    /// Bearer credential for the upstream API.
    pub api_key: Option<SecretString>,
    /// Upper bound for a single upstream round trip. No timeout when unset.
    #[serde(deserialize_with = "deserialize_option_duration")]
    pub timeout: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            path: Cow::Borrowed("/api"),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: None,
        }
    }
}

impl RelayConfig {
    /// Full URL of the upstream chat completion endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Whether an upstream credential has been configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}
