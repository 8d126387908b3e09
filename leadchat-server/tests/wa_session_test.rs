//! Session credential vault tests

mod common;

use common::{create_account, create_test_server};
use serde_json::{json, Value};

/// Test: saving a credential for an unknown account fails
#[tokio::test]
async fn test_save_unknown_account() {
    let (server, _, _, _) = create_test_server();

    let response = server
        .post("/whatsapp-auth/save")
        .json(&json!({ "accountId": 42, "sessionName": "default", "payload": "blob" }))
        .await;

    assert_eq!(response.status_code(), 404);
}

/// Test: saving requires a session name and payload
#[tokio::test]
async fn test_save_validation() {
    let (server, state, _, _) = create_test_server();
    let account = create_account(&state, "user@example.com");

    let response = server
        .post("/whatsapp-auth/save")
        .json(&json!({ "accountId": account.id.0, "sessionName": "", "payload": "blob" }))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = server
        .post("/whatsapp-auth/save")
        .json(&json!({ "accountId": account.id.0, "sessionName": "default", "payload": "" }))
        .await;
    assert_eq!(response.status_code(), 400);
}

/// Test: save, check existence, verify, delete round trip
#[tokio::test]
async fn test_credential_lifecycle() {
    let (server, state, _, _) = create_test_server();
    let account = create_account(&state, "user@example.com");

    let query = json!({ "accountId": account.id.0, "sessionName": "default" });

    let response = server.post("/whatsapp-auth/session-exists").json(&query).await;
    let body: Value = response.json();
    assert_eq!(body["exists"], false);

    let response = server
        .post("/whatsapp-auth/save")
        .json(&json!({ "accountId": account.id.0, "sessionName": "default", "payload": "blob-1" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    let response = server.post("/whatsapp-auth/session-exists").json(&query).await;
    let body: Value = response.json();
    assert_eq!(body["exists"], true);

    let response = server.post("/whatsapp-auth/verify").json(&query).await;
    let body: Value = response.json();
    assert_eq!(body["valid"], true);

    let response = server
        .delete(&format!("/whatsapp-auth/{}/default", account.id.0))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = server.post("/whatsapp-auth/verify").json(&query).await;
    let body: Value = response.json();
    assert_eq!(body["valid"], false);
}

/// Test: a later save supersedes the prior blob for the same key
#[tokio::test]
async fn test_save_supersedes() {
    let (server, state, _, _) = create_test_server();
    let account = create_account(&state, "user@example.com");

    for payload in ["blob-1", "blob-2"] {
        let response = server
            .post("/whatsapp-auth/save")
            .json(&json!({
                "accountId": account.id.0,
                "sessionName": "default",
                "payload": payload
            }))
            .await;
        assert_eq!(response.status_code(), 200);
    }

    // Still a single credential for the key
    use leadchat_server::AccountStore;
    assert!(state
        .accounts
        .credential_exists(account.id, "default")
        .unwrap());

    let response = server
        .delete(&format!("/whatsapp-auth/{}/default", account.id.0))
        .await;
    assert_eq!(response.status_code(), 200);

    // Nothing left to delete
    let response = server
        .delete(&format!("/whatsapp-auth/{}/default", account.id.0))
        .await;
    assert_eq!(response.status_code(), 404);
}

/// Test: credentials are scoped per (account, session name)
#[tokio::test]
async fn test_credentials_scoped_per_key() {
    let (server, state, _, _) = create_test_server();
    let account = create_account(&state, "user@example.com");

    server
        .post("/whatsapp-auth/save")
        .json(&json!({ "accountId": account.id.0, "sessionName": "primary", "payload": "blob" }))
        .await;

    let response = server
        .post("/whatsapp-auth/session-exists")
        .json(&json!({ "accountId": account.id.0, "sessionName": "secondary" }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["exists"], false);
}
