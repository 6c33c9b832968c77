//! Integration tests for the honeypot HTTP surface.
//!
//! Drives the full router (middleware stack included) with in-memory
//! adapters, a mock AI provider and a recording callback sender.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use honeypot::adapters::ai::{MockAIProvider, PersonaReplyGenerator, FALLBACK_REPLIES};
use honeypot::adapters::callback::RecordingCallbackSender;
use honeypot::adapters::http::{app_router, honeypot_routes, ApiKeyState, HoneypotHandlers};
use honeypot::adapters::memory::InMemorySessionStore;
use honeypot::application::{CallbackDispatcher, EngageHandler};
use honeypot::config::ServerConfig;
use honeypot::domain::foundation::SessionId;
use honeypot::ports::{AIProvider, SessionStore};

const API_KEY: &str = "test-api-key-0001";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    router: Router,
    store: InMemorySessionStore,
    sender: RecordingCallbackSender,
}

fn test_app(provider: MockAIProvider) -> TestApp {
    let store = InMemorySessionStore::new();
    let sender = RecordingCallbackSender::new();

    let replies = PersonaReplyGenerator::new(Some(Arc::new(provider) as Arc<dyn AIProvider>));
    let dispatcher = CallbackDispatcher::new(Arc::new(store.clone()), Arc::new(sender.clone()));
    let engage = EngageHandler::new(Arc::new(store.clone()), Arc::new(replies), dispatcher);

    let router = app_router(
        honeypot_routes(
            HoneypotHandlers::new(Arc::new(engage)),
            ApiKeyState::new(SecretString::new(API_KEY.to_string())),
        ),
        &ServerConfig::default(),
    );

    TestApp {
        router,
        store,
        sender,
    }
}

fn post(body: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/honeypot")
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn message(session: &str, text: &str) -> String {
    json!({
        "sessionId": session,
        "message": {"sender": "scammer", "text": text, "timestamp": chrono::Utc::now().timestamp_millis()},
        "conversationHistory": [],
        "metadata": {"channel": "SMS", "language": "English", "locale": "IN"}
    })
    .to_string()
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn wait_for_callback(store: &InMemorySessionStore, id: &str) -> bool {
    let id = SessionId::new(id).unwrap();
    for _ in 0..100 {
        if let Some(session) = store.load(&id).await.unwrap() {
            if session.callback_sent() {
                return true;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

// =============================================================================
// Health and auth
// =============================================================================

#[tokio::test]
async fn health_needs_no_key() {
    let app = test_app(MockAIProvider::new());
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "ok", "service": "honeypot", "endpoint": "/api/honeypot"})
    );
}

#[tokio::test]
async fn missing_key_is_rejected() {
    let app = test_app(MockAIProvider::new());

    let (status, body) = send(&app, post(&message("s1", "hello"), None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({"status": "error", "message": "Invalid API key or malformed request"})
    );
}

#[tokio::test]
async fn wrong_key_is_rejected_before_parsing() {
    let app = test_app(MockAIProvider::new());

    let (status, _) = send(&app, post("{not json", Some("wrong-key"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.store.is_empty().await);
}

// =============================================================================
// Malformed input
// =============================================================================

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = test_app(MockAIProvider::new());

    let (status, body) = send(&app, post("{not json", Some(API_KEY))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn empty_text_is_bad_request() {
    let app = test_app(MockAIProvider::new());

    let (status, body) = send(&app, post(&message("s1", "   "), Some(API_KEY))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid API key or malformed request");
}

// =============================================================================
// Engagement
// =============================================================================

#[tokio::test]
async fn benign_message_gets_neutral_reply() {
    let app = test_app(MockAIProvider::new());

    let (status, body) = send(
        &app,
        post(&message("benign", "Hi, is the project meeting still on?"), Some(API_KEY)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["scamDetected"], false);
    assert_eq!(body["engagementMetrics"]["totalMessagesExchanged"], 1);
    assert!(FALLBACK_REPLIES.contains(&body["reply"].as_str().unwrap()));
}

#[tokio::test]
async fn scam_message_is_engaged_and_mined() {
    let app = test_app(MockAIProvider::new().with_response("Which UPI sir? App is asking"));

    let (status, body) = send(
        &app,
        post(
            &message(
                "scam-1",
                "URGENT: your SBI account is blocked. Pay Rs 10 to refund@ybl or visit http://sbi-kyc.example.com",
            ),
            Some(API_KEY),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scamDetected"], true);
    assert_eq!(body["reply"], "Which UPI sir? App is asking");
    assert_eq!(body["engagementMetrics"]["totalMessagesExchanged"], 2);
    assert_eq!(body["extractedIntelligence"]["upiIds"], json!(["refund@ybl"]));
    assert_eq!(
        body["extractedIntelligence"]["phishingLinks"],
        json!(["http://sbi-kyc.example.com"])
    );
    assert_eq!(
        body["agentNotes"],
        "Scam detected. High-value intelligence extracted. | nextReply: Which UPI sir? App is asking"
    );
}

#[tokio::test]
async fn caller_history_feeds_extraction() {
    let app = test_app(MockAIProvider::new());
    let body = json!({
        "sessionId": "history-1",
        "message": {"sender": "scammer", "text": "Pay immediately or account suspended", "timestamp": 1768473060000_i64},
        "conversationHistory": [
            {"sender": "scammer", "text": "Send money to 123456789012 HDFC", "timestamp": 1768473000000_i64},
            {"sender": "user", "text": "Which account?", "timestamp": 1768473030000_i64},
            "junk"
        ]
    })
    .to_string();

    let (status, body) = send(&app, post(&body, Some(API_KEY))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scamDetected"], true);
    assert_eq!(
        body["extractedIntelligence"]["bankAccounts"],
        json!(["123456789012"])
    );
}

#[tokio::test]
async fn store_failure_returns_neutral_success() {
    let app = test_app(MockAIProvider::new());
    app.store.fail_next_saves(1);

    let (status, body) = send(
        &app,
        post(&message("broken", "Urgent: verify KYC now"), Some(API_KEY)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["scamDetected"], false);
    assert_eq!(body["engagementMetrics"]["totalMessagesExchanged"], 0);
    assert_eq!(body["agentNotes"], body["reply"]);
}

#[tokio::test]
async fn completed_engagement_reports_once() {
    let app = test_app(MockAIProvider::new());
    let turns = [
        "Your account is blocked. Verify immediately",
        "Pay the fee to refund@ybl",
        "Did you pay? Urgent",
        "Pay now or account suspended",
    ];

    for text in turns {
        let (status, _) = send(&app, post(&message("flow-1", text), Some(API_KEY))).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert!(wait_for_callback(&app.store, "flow-1").await);
    let sent = app.sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].session_id, "flow-1");
    assert!(sent[0].scam_detected);
    assert_eq!(sent[0].total_messages_exchanged, 8);
    assert!(sent[0].extracted_intelligence.upi_ids.contains("refund@ybl"));

    let (_, body) = send(&app, post(&message("flow-1", "Hello??"), Some(API_KEY))).await;
    assert_eq!(body["engagementMetrics"]["totalMessagesExchanged"], 10);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(app.sender.call_count(), 1);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = test_app(MockAIProvider::new());

    let response = app
        .router
        .clone()
        .oneshot(post(&message("rid", "hello"), Some(API_KEY)))
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}
