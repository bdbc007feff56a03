//! Task assistant tests against a mocked chat gateway.

use super::support::{day, stored_task};
use crate::board::{
    adapters::memory::InMemoryTaskStore,
    domain::{Priority, Role, UserId},
    ports::{ChatCompletionClient, ChatCompletionError, ChatCompletionResult, ChatMessage, ChatRole},
    services::{AssistantBody, AssistantRequest, TaskAssistantService, render_system_prompt},
};
use async_trait::async_trait;
use mockall::mock;
use rstest::{fixture, rstest};
use std::sync::Arc;

mock! {
    Gateway {}

    #[async_trait]
    impl ChatCompletionClient for Gateway {
        async fn complete(&self, messages: &[ChatMessage]) -> ChatCompletionResult<Option<String>>;
    }
}

#[fixture]
fn store() -> Arc<InMemoryTaskStore> {
    Arc::new(InMemoryTaskStore::seeded(vec![
        stored_task(
            Role::Estimation,
            "AWAITING PO",
            "Chase PO for signage",
            Priority::Urgent,
            day(2025, 5, 1),
            None,
        ),
        stored_task(
            Role::Estimation,
            "SUPPLIER QUOTES PENDING",
            "Quote vinyl rolls",
            Priority::High,
            day(2025, 5, 2),
            None,
        ),
        stored_task(
            Role::Estimation,
            "DONE",
            "Invoice banners",
            Priority::Urgent,
            day(2025, 4, 1),
            Some(day(2025, 4, 2)),
        ),
        stored_task(
            Role::Designer,
            "PRODUCTION",
            "Poster",
            Priority::Urgent,
            day(2025, 5, 3),
            None,
        ),
    ]))
}

fn request() -> AssistantRequest {
    AssistantRequest {
        message: "What should I do first?".to_owned(),
        user_id: UserId::new(),
        user_role: Role::Estimation,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reply_is_relayed_with_pending_task_context(store: Arc<InMemoryTaskStore>) {
    let mut gateway = MockGateway::new();
    gateway
        .expect_complete()
        .withf(|messages: &[ChatMessage]| {
            let [system, user] = messages else {
                return false;
            };
            system.role == ChatRole::System
                && system.content.contains("Pending tasks: 2")
                && system.content.contains("Urgent: 1")
                && system.content.contains("High priority: 1")
                && system.content.contains("Chase PO for signage")
                && !system.content.contains("Invoice banners")
                && !system.content.contains("Poster")
                && user.role == ChatRole::User
                && user.content == "What should I do first?"
        })
        .times(1)
        .returning(|_| Ok(Some("Chase the PO first.".to_owned())));
    let service = TaskAssistantService::new(store, Arc::new(gateway));

    let response = service.respond(&request()).await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.reply_text(), Some("Chase the PO first."));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_reply_becomes_an_apology(store: Arc<InMemoryTaskStore>) {
    let mut gateway = MockGateway::new();
    gateway.expect_complete().returning(|_| Ok(None));
    let service = TaskAssistantService::new(store, Arc::new(gateway));

    let response = service.respond(&request()).await;

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.reply_text(),
        Some("I'm sorry, I couldn't process that.")
    );
}

#[rstest]
#[case::rate_limited(ChatCompletionError::RateLimited, 429, "Rate limits exceeded, please try again later.")]
#[case::payment(
    ChatCompletionError::PaymentRequired,
    402,
    "Payment required, please add funds to the assistant workspace."
)]
#[case::upstream(
    ChatCompletionError::Upstream { status: 503, message: "overloaded".to_owned() },
    500,
    "AI gateway error"
)]
#[tokio::test(flavor = "multi_thread")]
async fn gateway_failures_map_to_statuses(
    store: Arc<InMemoryTaskStore>,
    #[case] failure: ChatCompletionError,
    #[case] status: u16,
    #[case] message: &str,
) {
    let mut gateway = MockGateway::new();
    gateway
        .expect_complete()
        .returning(move |_| Err(failure.clone()));
    let service = TaskAssistantService::new(store, Arc::new(gateway));

    let response = service.respond(&request()).await;

    assert_eq!(response.status(), status);
    assert_eq!(response.error_text(), Some(message));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transport_failures_surface_their_message(store: Arc<InMemoryTaskStore>) {
    let mut gateway = MockGateway::new();
    gateway.expect_complete().returning(|_| {
        Err(ChatCompletionError::transport(std::io::Error::other(
            "dns lookup failed",
        )))
    });
    let service = TaskAssistantService::new(store, Arc::new(gateway));

    let response = service.respond(&request()).await;

    assert_eq!(response.status(), 500);
    assert!(
        response
            .error_text()
            .is_some_and(|text| text.contains("dns lookup failed"))
    );
}

#[rstest]
fn request_and_body_use_the_wire_field_names() {
    let parsed: AssistantRequest = serde_json::from_str(
        r#"{"message":"hi","userId":"6f1c1b1e-8a59-4c4e-9a55-0d8f7f1d2a10","userRole":"designer"}"#,
    )
    .expect("valid request");
    let reply = serde_json::to_string(&AssistantBody::Reply {
        reply: "ok".to_owned(),
    })
    .expect("serializable body");
    let error = serde_json::to_string(&AssistantBody::Error {
        error: "nope".to_owned(),
    })
    .expect("serializable body");

    assert_eq!(parsed.user_role, Role::Designer);
    assert_eq!(reply, r#"{"reply":"ok"}"#);
    assert_eq!(error, r#"{"error":"nope"}"#);
}

#[rstest]
fn prompt_for_an_idle_role_reports_zero_counts() {
    let prompt = render_system_prompt(Role::Operations, &[]).expect("prompt renders");

    assert!(prompt.contains("operations team"));
    assert!(prompt.contains("Pending tasks: 0"));
    assert!(prompt.contains("[]"));
}
