//! Common test utilities for server integration tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use axum_test::TestServer;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use leadchat_core::TokenSigner;
use leadchat_server::payments::{
    CheckoutDetails, CheckoutSession, PaymentError, PaymentProvider,
};
use leadchat_server::store::Account;
use leadchat_server::{
    routes, AccountStore, AppState, EmailSender, InMemoryAccountStore, InMemoryLeadStore,
};

pub const WEBHOOK_SECRET: &str = "whsec_test123secret456";
pub const TOKEN_SECRET: &[u8] = b"test-token-secret";
pub const CLIENT_URL: &str = "http://localhost:3000";

pub type TestState =
    Arc<AppState<InMemoryAccountStore, InMemoryLeadStore, MockEmailSender, MockPaymentProvider>>;

/// Mock email sender that captures magic links
#[derive(Default, Clone)]
pub struct MockEmailSender {
    /// Captured (email, link) pairs
    pub sent: Arc<RwLock<Vec<(String, String)>>>,
    failing: Arc<AtomicBool>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the last magic link sent to an email
    pub fn last_link(&self, email: &str) -> Option<String> {
        self.sent
            .read()
            .unwrap()
            .iter()
            .rev()
            .find(|(e, _)| e == email)
            .map(|(_, link)| link.clone())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.read().unwrap().len()
    }

    /// Make subsequent sends fail (simulates the mail provider being down)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl EmailSender for MockEmailSender {
    fn send_magic_link(&self, email: &str, link: &str) -> Result<(), String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("smtp unavailable".to_string());
        }
        self.sent
            .write()
            .unwrap()
            .push((email.to_string(), link.to_string()));
        Ok(())
    }
}

/// Mock payment provider with scripted checkout sessions
#[derive(Default, Clone)]
pub struct MockPaymentProvider {
    sessions: Arc<RwLock<HashMap<String, CheckoutDetails>>>,
    fetch_failing: Arc<AtomicBool>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the provider-side truth for a checkout session
    pub fn add_session(&self, session_id: &str, payer_email: &str, product_id: &str) {
        self.sessions.write().unwrap().insert(
            session_id.to_string(),
            CheckoutDetails {
                payer_email: Some(payer_email.to_string()),
                product_id: Some(product_id.to_string()),
            },
        );
    }

    /// Make session lookups fail (simulates a provider timeout)
    pub fn set_fetch_failing(&self, failing: bool) {
        self.fetch_failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(
        &self,
        price_id: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        Ok(CheckoutSession {
            id: format!("cs_test_{price_id}"),
            url: None,
        })
    }

    async fn fetch_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutDetails, PaymentError> {
        if self.fetch_failing.load(Ordering::SeqCst) {
            return Err(PaymentError::Api {
                status: 504,
                message: "timed out".to_string(),
            });
        }
        self.sessions
            .read()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or(PaymentError::Api {
                status: 404,
                message: "no such session".to_string(),
            })
    }
}

/// Create a test server over in-memory stores with mock collaborators
pub fn create_test_server() -> (TestServer, TestState, MockEmailSender, MockPaymentProvider) {
    let email = MockEmailSender::new();
    let payments = MockPaymentProvider::new();

    let state = Arc::new(AppState::new(
        InMemoryAccountStore::new(),
        InMemoryLeadStore::new(),
        email.clone(),
        payments.clone(),
        TokenSigner::new(TOKEN_SECRET),
        WEBHOOK_SECRET.to_string(),
        CLIENT_URL.to_string(),
    ));

    let app = routes::create_router(Arc::clone(&state));
    let server = TestServer::new(app).expect("Failed to create test server");

    (server, state, email, payments)
}

/// Resolve an account directly in the store
pub fn create_account(state: &TestState, email: &str) -> Account {
    state.accounts.create_or_update(email).unwrap()
}

/// Compute a valid signature header for a webhook payload
pub fn sign_webhook(payload: &[u8]) -> String {
    sign_webhook_with(payload, WEBHOOK_SECRET, chrono::Utc::now().timestamp())
}

/// Compute a signature header with an explicit secret and timestamp
pub fn sign_webhook_with(payload: &[u8], secret: &str, timestamp: i64) -> String {
    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    let signature = hex::encode(mac.finalize().into_bytes());

    format!("t={timestamp},v1={signature}")
}

/// A checkout event payload as the provider would deliver it
pub fn checkout_event(event_id: &str, event_type: &str, session_id: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "id": event_id,
        "type": event_type,
        "data": { "object": { "id": session_id, "payment_status": "paid" } }
    }))
    .unwrap()
}
