//! Shared application state

use leadchat_core::TokenSigner;

/// Application state shared by all request handlers.
///
/// Generic over the store, mail, and payment collaborators so tests can
/// swap in in-memory and mock implementations.
pub struct AppState<A, L, E, P> {
    /// Identity store, purchase ledger, credential vault, and event log
    pub accounts: A,
    /// Buckets, contacts, and templates
    pub leads: L,
    /// Magic-link mail collaborator
    pub email: E,
    /// Payment provider collaborator
    pub payments: P,
    /// Login token signer
    pub tokens: TokenSigner,
    /// Shared secret for webhook signature verification
    pub webhook_secret: String,
    /// Frontend base URL, used to build magic-link URLs
    pub client_url: String,
}

impl<A, L, E, P> AppState<A, L, E, P> {
    pub fn new(
        accounts: A,
        leads: L,
        email: E,
        payments: P,
        tokens: TokenSigner,
        webhook_secret: String,
        client_url: String,
    ) -> Self {
        Self {
            accounts,
            leads,
            email,
            payments,
            tokens,
            webhook_secret,
            client_url: client_url.trim_end_matches('/').to_string(),
        }
    }

    /// The login URL mailed to a user for a freshly issued token
    pub fn magic_link_url(&self, token: &str) -> String {
        format!("{}/auth?token={}", self.client_url, token)
    }
}
