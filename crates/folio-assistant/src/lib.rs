//! # folio-assistant: Assistant Responder
//!
//! Produces a reply to a student's chat message. Two paths:
//!
//! - **Backend**: when a completion backend is configured, the reply comes
//!   from an OpenAI-compatible chat completions endpoint. The system prompt
//!   combines a fixed persona, a per-category instruction and a digest of
//!   the student's profile. Prior turns follow oldest-first, then the new
//!   message.
//! - **Fallback**: without a backend, one of a small set of canned
//!   paragraphs for the conversation's category is picked uniformly at
//!   random. The profile is not consulted.
//!
//! The responder is stateless per call. Persisting the exchange is the
//! caller's job.
//!
//! Backend failures (transport errors, non-2xx, malformed bodies) are
//! returned as [`AssistantError`]. Nothing is retried.

pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod prompt;
pub mod responder;

pub use client::{ChatTurn, CompletionClient};
pub use config::{CompletionConfig, ConfigError};
pub use error::AssistantError;
pub use prompt::ProfileDigest;
pub use responder::{Reply, ReplySource, Responder};
