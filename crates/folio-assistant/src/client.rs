//! Typed client for an OpenAI-compatible chat completions endpoint.
//!
//! Request: `{model, messages: [{role, content}], max_tokens, temperature}`.
//! Response: the first choice's `message.content` is the reply.

use std::time::Duration;

use folio_core::MessageRole;
use serde::{Deserialize, Serialize};

use crate::config::{CompletionConfig, ConfigError};
use crate::error::AssistantError;

/// One prior turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    /// Who wrote it.
    pub role: MessageRole,
    /// Text of the turn.
    pub content: String,
}

impl ChatTurn {
    /// A turn written by the student.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// A turn written by the assistant.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// -- Wire types ---------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn wire_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

// -- Client -------------------------------------------------------------------

/// Client for the completion backend.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    config: CompletionConfig,
}

impl CompletionClient {
    /// Build a client with the bearer key installed as a default header.
    pub fn new(config: CompletionConfig) -> Result<Self, AssistantError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::AUTHORIZATION,
                    reqwest::header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                        .map_err(|_| ConfigError::InvalidApiKey)?,
                );
                headers
            })
            .build()
            .map_err(|e| AssistantError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self { http, config })
    }

    /// Model name requests are sent with.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Request a completion for `system` followed by `turns`, in order.
    pub async fn complete(
        &self,
        system: &str,
        turns: &[ChatTurn],
    ) -> Result<String, AssistantError> {
        let endpoint = self.config.api_url.as_str();

        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(WireMessage {
            role: "system",
            content: system,
        });
        messages.extend(turns.iter().map(|t| WireMessage {
            role: wire_role(t.role),
            content: &t.content,
        }));

        let body = CompletionRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let resp = self
            .http
            .post(self.config.api_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::Http {
                endpoint: endpoint.to_string(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AssistantError::Api { status, body });
        }

        let bytes = resp.bytes().await.map_err(|e| AssistantError::Http {
            endpoint: endpoint.to_string(),
            source: e,
        })?;
        let parsed: CompletionResponse = serde_json::from_slice(&bytes)
            .map_err(|e| AssistantError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AssistantError::Malformed("response contained no completion text".into()))
    }
}
