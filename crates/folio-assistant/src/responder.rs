//! The responder: backend when configured, canned fallback otherwise.

use folio_core::AssistantCategory;
use serde::{Deserialize, Serialize};

use crate::client::{ChatTurn, CompletionClient};
use crate::error::AssistantError;
use crate::fallback;
use crate::prompt::{self, ProfileDigest};

/// Which path produced a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplySource {
    /// The completion backend, with the model that answered.
    Backend { model: String },
    /// A canned paragraph.
    Fallback,
}

impl ReplySource {
    /// Short label stored alongside the message (`fallback` or the model name).
    pub fn label(&self) -> &str {
        match self {
            Self::Backend { model } => model,
            Self::Fallback => "fallback",
        }
    }
}

/// A generated reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

/// Produces replies to chat messages.
#[derive(Debug, Clone, Default)]
pub struct Responder {
    backend: Option<CompletionClient>,
}

impl Responder {
    /// Responder that delegates to `backend` when present.
    pub fn new(backend: Option<CompletionClient>) -> Self {
        Self { backend }
    }

    /// Responder that always uses canned replies.
    pub fn fallback_only() -> Self {
        Self { backend: None }
    }

    /// Whether a completion backend is configured.
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Reply to `message`, given the conversation's prior turns oldest-first.
    pub async fn respond(
        &self,
        category: AssistantCategory,
        digest: &ProfileDigest,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<Reply, AssistantError> {
        match &self.backend {
            Some(client) => {
                let system = prompt::system_prompt(category, digest);
                let mut turns = history.to_vec();
                turns.push(ChatTurn::user(message));
                let text = client.complete(&system, &turns).await?;
                Ok(Reply {
                    text,
                    source: ReplySource::Backend {
                        model: client.model().to_string(),
                    },
                })
            }
            None => {
                let text = fallback::pick(category, &mut rand::thread_rng()).to_string();
                Ok(Reply {
                    text,
                    source: ReplySource::Fallback,
                })
            }
        }
    }
}
