//! Chat-completion gateway port used by the task assistant.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Result type for chat-completion calls.
pub type ChatCompletionResult<T> = Result<T, ChatCompletionError>;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instructions framing the conversation.
    System,
    /// End-user input.
    User,
    /// Model output.
    Assistant,
}

/// One message of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// External chat-completion API.
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    /// Sends a conversation and returns the first reply, if the upstream
    /// produced one.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatCompletionError`] classified by upstream status.
    async fn complete(&self, messages: &[ChatMessage]) -> ChatCompletionResult<Option<String>>;
}

/// Errors returned by chat-completion adapters.
#[derive(Debug, Clone, Error)]
pub enum ChatCompletionError {
    /// The upstream rejected the call for rate limiting.
    #[error("chat upstream rate limited the request")]
    RateLimited,

    /// The upstream account needs funds.
    #[error("chat upstream requires payment")]
    PaymentRequired,

    /// The upstream answered with another error status.
    #[error("chat upstream returned status {status}: {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Upstream error body or message.
        message: String,
    },

    /// The call could not be made or its reply could not be read.
    #[error("chat transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl ChatCompletionError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
