//! Data models for server storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub i64);

/// An account, keyed by its unique email
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// One entry in an account's purchase ledger.
///
/// The (account, product, transaction) triple is unique; replaying a
/// transaction id never creates a second entry.
#[derive(Debug, Clone)]
pub struct Purchase {
    pub account_id: AccountId,
    pub product_id: String,
    pub transaction_id: String,
    pub created_at: DateTime<Utc>,
}

/// A named, owner-scoped collection of contacts
#[derive(Debug, Clone)]
pub struct Bucket {
    pub id: String,
    pub name: String,
    pub owner_id: AccountId,
    pub created_at: DateTime<Utc>,
}

/// A bucket together with its contact count, for listings
#[derive(Debug, Clone)]
pub struct BucketSummary {
    pub bucket: Bucket,
    pub contact_count: u64,
}

/// A harvested contact stored in a bucket.
///
/// (whatsapp_id, bucket_id) is unique; exports upsert on that key.
#[derive(Debug, Clone)]
pub struct Contact {
    pub id: String,
    pub whatsapp_id: String,
    pub name: String,
    pub phone_number: String,
    pub group_id: String,
    pub group_name: String,
    pub bucket_id: String,
}

/// An incoming contact candidate from an export batch
#[derive(Debug, Clone)]
pub struct CandidateContact {
    pub whatsapp_id: String,
    pub name: String,
    pub phone_number: String,
    pub group_id: String,
    pub group_name: String,
}

/// Result of applying an export batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOutcome {
    /// Contacts newly inserted into the bucket
    pub added: u64,
    /// Contacts already present; mutable fields refreshed in place
    pub skipped: u64,
    /// Candidates dropped for a missing external identifier
    pub rejected: u64,
}

/// A reusable outbound message template
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    pub id: String,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// An opaque persisted messaging-session blob.
///
/// (account_id, session_name) is unique; a later save supersedes the blob.
#[derive(Debug, Clone)]
pub struct SessionCredential {
    pub account_id: AccountId,
    pub session_name: String,
    pub blob: String,
    pub updated_at: DateTime<Utc>,
}

/// Processing state of a logged webhook event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    /// Awaiting processing (or awaiting retry after a failure)
    Pending,
    /// Claimed by a processor
    Inflight,
    /// Side effects applied (or terminal no-op)
    Processed,
    /// Gave up after repeated failures; kept for manual inspection
    Dead,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::Inflight => "inflight",
            EventStatus::Processed => "processed",
            EventStatus::Dead => "dead",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(EventStatus::Pending),
            "inflight" => Some(EventStatus::Inflight),
            "processed" => Some(EventStatus::Processed),
            "dead" => Some(EventStatus::Dead),
            _ => None,
        }
    }
}

/// A durably recorded provider event (the commit log).
///
/// The provider is acknowledged once the event is in this log; side effects
/// are applied asynchronously and retried from here.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub id: i64,
    /// Provider-assigned event id; unique, absorbs redelivery
    pub event_id: String,
    pub event_type: String,
    /// Raw event payload as received (post-verification)
    pub payload: String,
    pub status: EventStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}
