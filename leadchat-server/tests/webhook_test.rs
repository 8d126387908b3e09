//! Webhook verification and payment reconciliation tests

mod common;

use common::{
    checkout_event, create_test_server, sign_webhook, sign_webhook_with, WEBHOOK_SECRET,
};
use serde_json::Value;

use leadchat_server::reconciler;
use leadchat_server::store::{AccountStore, EventLog, EventStatus};

/// Test: a webhook with no signature header is rejected
#[tokio::test]
async fn test_webhook_missing_signature() {
    let (server, state, _, _) = create_test_server();
    let payload = checkout_event("evt_1", "checkout.session.completed", "cs_123");

    let response = server.post("/stripe/webhook").bytes(payload.into()).await;

    assert_eq!(response.status_code(), 400);
    assert!(state.accounts.find_event("evt_1").unwrap().is_none());
}

/// Test: an invalid signature is rejected and nothing is recorded
#[tokio::test]
async fn test_webhook_invalid_signature() {
    let (server, state, _, payments) = create_test_server();
    payments.add_session("cs_123", "buyer@example.com", "prod_A");
    let payload = checkout_event("evt_1", "checkout.session.completed", "cs_123");

    let header = sign_webhook_with(&payload, "wrong_secret", chrono::Utc::now().timestamp());
    let response = server
        .post("/stripe/webhook")
        .add_header("stripe-signature", header)
        .bytes(payload.into())
        .await;

    assert_eq!(response.status_code(), 400);

    // No state mutation of any kind
    assert!(state.accounts.find_event("evt_1").unwrap().is_none());
    assert!(state
        .accounts
        .find_by_email("buyer@example.com")
        .unwrap()
        .is_none());
}

/// Test: a stale timestamp fails verification even with a valid signature
#[tokio::test]
async fn test_webhook_stale_timestamp() {
    let (server, state, _, _) = create_test_server();
    let payload = checkout_event("evt_1", "checkout.session.completed", "cs_123");

    // Ten minutes old, beyond the five-minute tolerance
    let header =
        sign_webhook_with(&payload, WEBHOOK_SECRET, chrono::Utc::now().timestamp() - 600);
    let response = server
        .post("/stripe/webhook")
        .add_header("stripe-signature", header)
        .bytes(payload.into())
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(state.accounts.find_event("evt_1").unwrap().is_none());
}

/// Test: a completed checkout creates the account, appends the purchase,
/// and mails a magic link
#[tokio::test]
async fn test_completed_checkout_reconciles() {
    let (server, state, email, payments) = create_test_server();
    payments.add_session("cs_123", "new@x.com", "prod_A");
    let payload = checkout_event("evt_1", "checkout.session.completed", "cs_123");

    let response = server
        .post("/stripe/webhook")
        .add_header("stripe-signature", sign_webhook(&payload))
        .bytes(payload.into())
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["received"], true);

    reconciler::process_pending(&state).await.unwrap();

    let account = state.accounts.find_by_email("new@x.com").unwrap().unwrap();
    assert_eq!(state.accounts.purchases(account.id).unwrap(), vec!["prod_A"]);

    let event = state.accounts.find_event("evt_1").unwrap().unwrap();
    assert_eq!(event.status, EventStatus::Processed);

    let link = email.last_link("new@x.com").expect("magic link mailed");
    assert!(link.starts_with("http://localhost:3000/auth?token="));
}

/// Test: redelivering the same event does not double-apply the purchase
#[tokio::test]
async fn test_duplicate_delivery_is_idempotent() {
    let (server, state, _, payments) = create_test_server();
    payments.add_session("cs_123", "new@x.com", "prod_A");
    let payload = checkout_event("evt_1", "checkout.session.completed", "cs_123");

    for _ in 0..2 {
        let response = server
            .post("/stripe/webhook")
            .add_header("stripe-signature", sign_webhook(&payload))
            .bytes(payload.clone().into())
            .await;
        assert_eq!(response.status_code(), 200);
        reconciler::process_pending(&state).await.unwrap();
    }

    let account = state.accounts.find_by_email("new@x.com").unwrap().unwrap();
    assert_eq!(state.accounts.purchases(account.id).unwrap(), vec!["prod_A"]);
}

/// Test: two distinct events for the same transaction yield one account
/// with the product exactly once
#[tokio::test]
async fn test_same_transaction_across_events() {
    let (server, state, _, payments) = create_test_server();
    payments.add_session("cs_123", "new@x.com", "prod_A");

    for event_id in ["evt_1", "evt_2"] {
        let payload = checkout_event(event_id, "checkout.session.completed", "cs_123");
        let response = server
            .post("/stripe/webhook")
            .add_header("stripe-signature", sign_webhook(&payload))
            .bytes(payload.into())
            .await;
        assert_eq!(response.status_code(), 200);
    }

    reconciler::process_pending(&state).await.unwrap();

    let account = state.accounts.find_by_email("new@x.com").unwrap().unwrap();
    assert_eq!(state.accounts.purchases(account.id).unwrap(), vec!["prod_A"]);
}

/// Test: a second purchase by the same payer appends to the same account
#[tokio::test]
async fn test_second_purchase_appends() {
    let (server, state, _, payments) = create_test_server();
    payments.add_session("cs_1", "repeat@x.com", "prod_A");
    payments.add_session("cs_2", "repeat@x.com", "prod_B");

    for (event_id, session_id) in [("evt_1", "cs_1"), ("evt_2", "cs_2")] {
        let payload = checkout_event(event_id, "checkout.session.completed", session_id);
        server
            .post("/stripe/webhook")
            .add_header("stripe-signature", sign_webhook(&payload))
            .bytes(payload.into())
            .await;
        reconciler::process_pending(&state).await.unwrap();
    }

    let account = state.accounts.find_by_email("repeat@x.com").unwrap().unwrap();
    assert_eq!(
        state.accounts.purchases(account.id).unwrap(),
        vec!["prod_A", "prod_B"]
    );
}

/// Test: an expired checkout is a terminal no-op
#[tokio::test]
async fn test_expired_checkout_is_noop() {
    let (server, state, email, _) = create_test_server();
    let payload = checkout_event("evt_1", "checkout.session.expired", "cs_123");

    let response = server
        .post("/stripe/webhook")
        .add_header("stripe-signature", sign_webhook(&payload))
        .bytes(payload.into())
        .await;
    assert_eq!(response.status_code(), 200);

    reconciler::process_pending(&state).await.unwrap();

    let event = state.accounts.find_event("evt_1").unwrap().unwrap();
    assert_eq!(event.status, EventStatus::Processed);
    assert_eq!(email.sent_count(), 0);
}

/// Test: an unrecognized event type is acknowledged, not retried
#[tokio::test]
async fn test_unknown_event_type_acknowledged() {
    let (server, state, _, _) = create_test_server();
    let payload = checkout_event("evt_1", "invoice.paid", "in_123");

    let response = server
        .post("/stripe/webhook")
        .add_header("stripe-signature", sign_webhook(&payload))
        .bytes(payload.into())
        .await;
    assert_eq!(response.status_code(), 200);

    reconciler::process_pending(&state).await.unwrap();

    let event = state.accounts.find_event("evt_1").unwrap().unwrap();
    assert_eq!(event.status, EventStatus::Processed);
}

/// Test: a provider lookup failure records no purchase; the event stays
/// pending and succeeds once the provider recovers
#[tokio::test]
async fn test_provider_failure_retries_without_applying() {
    let (server, state, _, payments) = create_test_server();
    payments.add_session("cs_123", "new@x.com", "prod_A");
    payments.set_fetch_failing(true);

    let payload = checkout_event("evt_1", "checkout.session.completed", "cs_123");
    let response = server
        .post("/stripe/webhook")
        .add_header("stripe-signature", sign_webhook(&payload))
        .bytes(payload.into())
        .await;

    // The provider still gets its acknowledgment
    assert_eq!(response.status_code(), 200);

    reconciler::process_pending(&state).await.unwrap();

    // Nothing applied, event parked for retry with the error recorded
    assert!(state.accounts.find_by_email("new@x.com").unwrap().is_none());
    let event = state.accounts.find_event("evt_1").unwrap().unwrap();
    assert_eq!(event.status, EventStatus::Pending);
    assert!(event.last_error.is_some());

    // Provider recovers; the retry applies the purchase
    payments.set_fetch_failing(false);
    reconciler::process_pending(&state).await.unwrap();

    let account = state.accounts.find_by_email("new@x.com").unwrap().unwrap();
    assert_eq!(state.accounts.purchases(account.id).unwrap(), vec!["prod_A"]);
    let event = state.accounts.find_event("evt_1").unwrap().unwrap();
    assert_eq!(event.status, EventStatus::Processed);
}

/// Test: an event that keeps failing is dead-lettered, not retried forever
#[tokio::test]
async fn test_persistent_failure_dead_letters() {
    let (server, state, _, payments) = create_test_server();
    payments.set_fetch_failing(true);

    let payload = checkout_event("evt_1", "checkout.session.completed", "cs_123");
    server
        .post("/stripe/webhook")
        .add_header("stripe-signature", sign_webhook(&payload))
        .bytes(payload.into())
        .await;

    for _ in 0..reconciler::MAX_ATTEMPTS {
        reconciler::process_pending(&state).await.unwrap();
    }

    let event = state.accounts.find_event("evt_1").unwrap().unwrap();
    assert_eq!(event.status, EventStatus::Dead);
    assert_eq!(event.attempts, reconciler::MAX_ATTEMPTS);

    // A dead event is no longer claimed
    reconciler::process_pending(&state).await.unwrap();
    let event = state.accounts.find_event("evt_1").unwrap().unwrap();
    assert_eq!(event.attempts, reconciler::MAX_ATTEMPTS);
}

/// Test: checkout session creation proxies the provider
#[tokio::test]
async fn test_create_checkout_session() {
    let (server, _, _, _) = create_test_server();

    let response = server
        .post("/stripe/create-checkout-session")
        .json(&serde_json::json!({ "priceId": "price_123" }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["id"], "cs_test_price_123");
}

/// Test: checkout session creation requires a price id
#[tokio::test]
async fn test_create_checkout_session_requires_price() {
    let (server, _, _, _) = create_test_server();

    let response = server
        .post("/stripe/create-checkout-session")
        .json(&serde_json::json!({ "priceId": "" }))
        .await;

    assert_eq!(response.status_code(), 400);
}
