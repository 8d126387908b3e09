//! Bucket endpoint tests

mod common;

use common::{create_account, create_test_server};
use serde_json::{json, Value};

/// Test: creating a bucket requires a name
#[tokio::test]
async fn test_create_bucket_requires_name() {
    let (server, state, _, _) = create_test_server();
    let account = create_account(&state, "owner@example.com");

    let response = server
        .post("/buckets")
        .json(&json!({ "name": "", "accountId": account.id.0 }))
        .await;

    assert_eq!(response.status_code(), 400);
}

/// Test: creating a bucket for an unknown owner fails
#[tokio::test]
async fn test_create_bucket_unknown_owner() {
    let (server, _, _, _) = create_test_server();

    let response = server
        .post("/buckets")
        .json(&json!({ "name": "Leads", "accountId": 42 }))
        .await;

    assert_eq!(response.status_code(), 404);
}

/// Test: created buckets appear in the listing
#[tokio::test]
async fn test_create_and_list_buckets() {
    let (server, state, _, _) = create_test_server();
    let account = create_account(&state, "owner@example.com");

    let response = server
        .post("/buckets")
        .json(&json!({ "name": "Leads", "accountId": account.id.0 }))
        .await;
    assert_eq!(response.status_code(), 200);
    let created: Value = response.json();
    assert_eq!(created["name"], "Leads");
    assert_eq!(created["ownerId"], account.id.0);
    assert_eq!(created["contactCount"], 0);

    let response = server.get("/buckets").await;
    assert_eq!(response.status_code(), 200);
    let buckets: Value = response.json();
    assert_eq!(buckets.as_array().unwrap().len(), 1);
    assert_eq!(buckets[0]["id"], created["id"]);
}

/// Test: listing contacts of an unknown bucket fails
#[tokio::test]
async fn test_contacts_of_unknown_bucket() {
    let (server, _, _, _) = create_test_server();

    let response = server.get("/buckets/no-such-bucket/contacts").await;

    assert_eq!(response.status_code(), 404);
}

/// Test: a fresh bucket has no contacts
#[tokio::test]
async fn test_new_bucket_is_empty() {
    let (server, state, _, _) = create_test_server();
    let account = create_account(&state, "owner@example.com");

    let response = server
        .post("/buckets")
        .json(&json!({ "name": "Leads", "accountId": account.id.0 }))
        .await;
    let created: Value = response.json();
    let bucket_id = created["id"].as_str().unwrap();

    let response = server.get(&format!("/buckets/{bucket_id}/contacts")).await;
    assert_eq!(response.status_code(), 200);
    let contacts: Value = response.json();
    assert!(contacts.as_array().unwrap().is_empty());
}
