//! Completion backend configuration.
//!
//! The backend is optional. [`CompletionConfig::from_env`] returns
//! [`ConfigError::MissingApiKey`] when no key is set, which callers treat
//! as "use the fallback responder".

use url::Url;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Configuration for an OpenAI-compatible chat completions endpoint.
///
/// Custom `Debug` implementation redacts the `api_key` field.
#[derive(Clone)]
pub struct CompletionConfig {
    /// Full URL of the chat completions endpoint.
    pub api_url: Url,
    /// Bearer key sent with every request.
    pub api_key: String,
    /// Model name sent in the request body.
    pub model: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl CompletionConfig {
    /// Build a configuration with default model parameters.
    pub fn new(api_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            api_url,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 500,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `COMPLETION_API_KEY` (required)
    /// - `COMPLETION_API_URL` (default: `https://api.openai.com/v1/chat/completions`)
    /// - `COMPLETION_MODEL` (default: `gpt-3.5-turbo`)
    /// - `COMPLETION_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("COMPLETION_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(env_url("COMPLETION_API_URL", DEFAULT_API_URL)?, api_key);
        if let Ok(model) = std::env::var("COMPLETION_MODEL") {
            if !model.trim().is_empty() {
                config.model = model;
            }
        }
        config.timeout_secs = std::env::var("COMPLETION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);
        Ok(config)
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("COMPLETION_API_KEY environment variable is not set")]
    MissingApiKey,
    #[error("COMPLETION_API_KEY contains characters not allowed in a header")]
    InvalidApiKey,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
