//! Storage abstractions for the server

pub mod memory;
pub mod models;
pub mod sqlite;

pub use memory::{InMemoryAccountStore, InMemoryLeadStore};
pub use models::*;
pub use sqlite::SqliteStore;

use crate::error::AppError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, AppError>;

/// Identity store: accounts, the purchase ledger, and the session
/// credential vault.
pub trait AccountStore: Send + Sync {
    /// Resolve an account by email, creating it if absent.
    ///
    /// This is an atomic upsert on the unique email: concurrent calls for
    /// the same email must never produce two accounts.
    fn create_or_update(&self, email: &str) -> StoreResult<Account>;

    /// Look up an account by email
    fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Look up an account by id
    fn find_by_id(&self, account_id: AccountId) -> StoreResult<Option<Account>>;

    /// Set-add a purchase keyed by (account, product, transaction id).
    ///
    /// Returns true if a new entry was recorded, false if the transaction
    /// was already applied.
    fn record_purchase(
        &self,
        account_id: AccountId,
        product_id: &str,
        transaction_id: &str,
    ) -> StoreResult<bool>;

    /// Ordered product ids of an account's purchases
    fn purchases(&self, account_id: AccountId) -> StoreResult<Vec<String>>;

    /// Upsert a session credential, superseding any prior blob for the key
    fn save_credential(
        &self,
        account_id: AccountId,
        session_name: &str,
        blob: &str,
    ) -> StoreResult<()>;

    /// Whether a credential is persisted for the key
    fn credential_exists(&self, account_id: AccountId, session_name: &str) -> StoreResult<bool>;

    /// Remove a persisted credential
    fn delete_credential(&self, account_id: AccountId, session_name: &str) -> StoreResult<()>;
}

/// Durable commit log of verified provider events
pub trait EventLog: Send + Sync {
    /// Record a verified event.
    ///
    /// Returns false if the event id was already logged (redelivery).
    fn append_event(&self, event_id: &str, event_type: &str, payload: &str) -> StoreResult<bool>;

    /// Atomically claim up to `limit` pending events for processing.
    ///
    /// Claimed events move to inflight with their attempt counter bumped,
    /// so concurrent sweeps cannot double-process.
    fn claim_pending(&self, max_attempts: u32, limit: u32) -> StoreResult<Vec<WebhookEvent>>;

    /// Mark a claimed event as fully processed
    fn mark_processed(&self, id: i64) -> StoreResult<()>;

    /// Record a failed attempt; the event returns to pending, or is
    /// dead-lettered once it has exhausted `max_attempts`.
    fn mark_failed(&self, id: i64, error: &str, max_attempts: u32) -> StoreResult<()>;

    /// Return inflight events to pending (startup recovery after a crash)
    fn recover_inflight(&self) -> StoreResult<u64>;

    /// Look up a logged event by provider event id
    fn find_event(&self, event_id: &str) -> StoreResult<Option<WebhookEvent>>;
}

/// Contact side: buckets, the dedup pipeline, and message templates
pub trait LeadStore: Send + Sync {
    /// Create a bucket owned by an account
    fn create_bucket(&self, name: &str, owner_id: AccountId) -> StoreResult<Bucket>;

    /// List buckets with their contact counts
    fn list_buckets(&self) -> StoreResult<Vec<BucketSummary>>;

    /// Look up a bucket by id
    fn find_bucket(&self, bucket_id: &str) -> StoreResult<Option<Bucket>>;

    /// List a bucket's contacts
    fn bucket_contacts(&self, bucket_id: &str) -> StoreResult<Vec<Contact>>;

    /// Apply an export batch to a bucket (see the dedup engine contract).
    ///
    /// Candidates upsert on (whatsapp_id, bucket_id): existing contacts get
    /// their mutable fields overwritten (last-write-wins) and count as
    /// skipped; new ones are inserted and count as added. Candidates with an
    /// empty external id are rejected individually. The batch applies
    /// atomically: a concurrent reader sees pre-batch or post-batch state,
    /// never part of one.
    fn export_batch(
        &self,
        bucket_id: &str,
        candidates: &[CandidateContact],
    ) -> StoreResult<ExportOutcome>;

    /// Create a message template
    fn create_template(&self, title: &str, message: &str) -> StoreResult<MessageTemplate>;

    /// List all message templates
    fn list_templates(&self) -> StoreResult<Vec<MessageTemplate>>;

    /// Look up a template by id
    fn find_template(&self, template_id: &str) -> StoreResult<Option<MessageTemplate>>;

    /// Update a template's title and message
    fn update_template(
        &self,
        template_id: &str,
        title: &str,
        message: &str,
    ) -> StoreResult<MessageTemplate>;

    /// Delete a template
    fn delete_template(&self, template_id: &str) -> StoreResult<()>;
}
