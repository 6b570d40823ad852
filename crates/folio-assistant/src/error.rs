//! Errors from the completion backend path.

use thiserror::Error;

use crate::config::ConfigError;

/// A completion call failed. Each variant is a hard failure of that call only.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("completion request to {endpoint} failed: {source}")]
    Http {
        /// Endpoint that was called.
        endpoint: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// Backend answered with a non-2xx status.
    #[error("completion backend returned {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, for logs.
        body: String,
    },

    /// Backend answered 2xx but the body was not a chat completion.
    #[error("malformed completion response: {0}")]
    Malformed(String),

    /// Client could not be built from configuration.
    #[error("completion client configuration error: {0}")]
    Config(#[from] ConfigError),
}
