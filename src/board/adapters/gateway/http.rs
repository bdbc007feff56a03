//! HTTP chat-completion client for OpenAI-compatible gateways.

use crate::board::ports::{
    ChatCompletionClient, ChatCompletionError, ChatCompletionResult, ChatMessage,
};
use crate::config::AssistantConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

impl CompletionResponse {
    fn into_reply(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
    }
}

/// Chat-completion client speaking the `/chat/completions` wire format.
pub struct HttpChatCompletionClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl HttpChatCompletionClient {
    /// Creates a client from assistant configuration.
    #[must_use]
    pub fn new(config: &AssistantConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Creates a client reusing an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: Client, config: &AssistantConfig) -> Self {
        Self {
            client,
            api_key: config.api_key().to_owned(),
            endpoint: config.endpoint().to_owned(),
            model: config.model().to_owned(),
        }
    }

    /// Returns the configured model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatCompletionClient for HttpChatCompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> ChatCompletionResult<Option<String>> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ChatCompletionError::transport)?;

        let status = response.status();
        if status.is_success() {
            let parsed: CompletionResponse =
                response.json().await.map_err(ChatCompletionError::transport)?;
            return Ok(parsed.into_reply());
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|err| format!("unreadable error body: {err}"));
        tracing::warn!(status = status.as_u16(), %message, "chat gateway returned an error");
        Err(classify_status(status, message))
    }
}

fn classify_status(status: StatusCode, message: String) -> ChatCompletionError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ChatCompletionError::RateLimited,
        StatusCode::PAYMENT_REQUIRED => ChatCompletionError::PaymentRequired,
        _ => ChatCompletionError::Upstream {
            status: status.as_u16(),
            message,
        },
    }
}

impl std::fmt::Debug for HttpChatCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpChatCompletionClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
