//! Task assistant: answers a user's question with their pending work as
//! context, through an external chat-completion gateway.

use crate::board::{
    domain::{Priority, Role, Task, UserId},
    ports::{
        ChatCompletionClient, ChatCompletionError, ChatMessage, TaskOrder, TaskQuery, TaskStore,
        TaskStoreError,
    },
};
use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

const SYSTEM_PROMPT_TEMPLATE: &str = "\
You help a creative agency team keep their pipeline board moving.

Board summary for the {{ role }} team:
- Pending tasks: {{ pending }}
- Urgent: {{ urgent }}
- High priority: {{ high }}

Pending tasks as JSON:
{{ tasks }}

Remind the user of urgent and overdue work first, suggest an order when \
asked, and keep every answer short and actionable.";

const EMPTY_REPLY: &str = "I'm sorry, I couldn't process that.";
const RATE_LIMITED_MESSAGE: &str = "Rate limits exceeded, please try again later.";
const PAYMENT_REQUIRED_MESSAGE: &str =
    "Payment required, please add funds to the assistant workspace.";
const GATEWAY_ERROR_MESSAGE: &str = "AI gateway error";

/// Incoming assistant question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    /// The user's question.
    pub message: String,
    /// Asking user.
    pub user_id: UserId,
    /// Role whose tasks give the context.
    pub user_role: Role,
}

/// Body of an assistant response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssistantBody {
    /// Successful answer.
    Reply {
        /// Assistant text.
        reply: String,
    },
    /// Failure description.
    Error {
        /// Error text.
        error: String,
    },
}

/// Assistant answer paired with the HTTP status it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantResponse {
    status: u16,
    body: AssistantBody,
}

impl AssistantResponse {
    fn reply(reply: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: AssistantBody::Reply {
                reply: reply.into(),
            },
        }
    }

    fn error(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            body: AssistantBody::Error {
                error: error.into(),
            },
        }
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the response body.
    #[must_use]
    pub const fn body(&self) -> &AssistantBody {
        &self.body
    }

    /// Returns the reply text for a successful response.
    #[must_use]
    pub fn reply_text(&self) -> Option<&str> {
        match &self.body {
            AssistantBody::Reply { reply } => Some(reply),
            AssistantBody::Error { .. } => None,
        }
    }

    /// Returns the error text for a failed response.
    #[must_use]
    pub fn error_text(&self) -> Option<&str> {
        match &self.body {
            AssistantBody::Error { error } => Some(error),
            AssistantBody::Reply { .. } => None,
        }
    }
}

/// Failures while preparing or obtaining an assistant answer.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Fetching the user's tasks failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
    /// Encoding the task context failed.
    #[error("failed to encode task context: {0}")]
    Encode(#[from] serde_json::Error),
    /// Rendering the system prompt failed.
    #[error("failed to render assistant prompt: {0}")]
    Prompt(#[from] minijinja::Error),
    /// The chat gateway failed.
    #[error(transparent)]
    Gateway(#[from] ChatCompletionError),
}

impl AssistantError {
    fn into_response(self) -> AssistantResponse {
        match self {
            Self::Gateway(ChatCompletionError::RateLimited) => {
                AssistantResponse::error(429, RATE_LIMITED_MESSAGE)
            }
            Self::Gateway(ChatCompletionError::PaymentRequired) => {
                AssistantResponse::error(402, PAYMENT_REQUIRED_MESSAGE)
            }
            Self::Gateway(ChatCompletionError::Upstream { .. }) => {
                AssistantResponse::error(500, GATEWAY_ERROR_MESSAGE)
            }
            other => AssistantResponse::error(500, other.to_string()),
        }
    }
}

/// Result type for assistant internals.
pub type AssistantResult<T> = Result<T, AssistantError>;

/// Task assistant proxy.
#[derive(Clone)]
pub struct TaskAssistantService<S, G>
where
    S: TaskStore,
    G: ChatCompletionClient,
{
    store: Arc<S>,
    gateway: Arc<G>,
}

impl<S, G> TaskAssistantService<S, G>
where
    S: TaskStore,
    G: ChatCompletionClient,
{
    /// Creates an assistant over a task store and chat gateway.
    #[must_use]
    pub const fn new(store: Arc<S>, gateway: Arc<G>) -> Self {
        Self { store, gateway }
    }

    /// Answers a question; failures become error responses with their
    /// HTTP status.
    pub async fn respond(&self, request: &AssistantRequest) -> AssistantResponse {
        match self.ask(request).await {
            Ok(reply) => AssistantResponse::reply(reply),
            Err(err) => {
                warn!(error = %err, user_id = %request.user_id, "task assistant failed");
                err.into_response()
            }
        }
    }

    async fn ask(&self, request: &AssistantRequest) -> AssistantResult<String> {
        let query = TaskQuery::board(request.user_role).ordered_by(TaskOrder::CreatedDescending);
        let tasks = self.store.select(&query).await?;
        let pending: Vec<Task> = tasks.into_iter().filter(|task| !task.is_done()).collect();

        let prompt = render_system_prompt(request.user_role, &pending)?;
        debug!(
            user_id = %request.user_id,
            role = %request.user_role,
            pending = pending.len(),
            "asking chat gateway"
        );
        let messages = [
            ChatMessage::system(prompt),
            ChatMessage::user(request.message.clone()),
        ];
        let reply = self.gateway.complete(&messages).await?;
        Ok(reply.unwrap_or_else(|| EMPTY_REPLY.to_owned()))
    }
}

/// Renders the system prompt describing the role's pending tasks.
///
/// # Errors
///
/// Returns [`AssistantError`] when the tasks cannot be encoded or the
/// template fails to render.
pub fn render_system_prompt(role: Role, pending: &[Task]) -> AssistantResult<String> {
    let count = |priority: Priority| {
        pending
            .iter()
            .filter(|task| task.priority() == priority)
            .count()
    };
    let tasks = serde_json::to_string_pretty(pending)?;
    let environment = Environment::new();
    let rendered = environment.render_str(
        SYSTEM_PROMPT_TEMPLATE,
        context! {
            role => role.as_str(),
            pending => pending.len(),
            urgent => count(Priority::Urgent),
            high => count(Priority::High),
            tasks => tasks,
        },
    )?;
    Ok(rendered)
}
