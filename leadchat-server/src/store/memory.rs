//! In-memory storage implementations, used by tests and development

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use chrono::Utc;
use uuid::Uuid;

use super::{
    Account, AccountId, AccountStore, Bucket, BucketSummary, CandidateContact, Contact,
    EventLog, EventStatus, ExportOutcome, LeadStore, MessageTemplate, Purchase,
    SessionCredential, StoreResult, WebhookEvent,
};
use crate::error::AppError;

/// In-memory identity store, purchase ledger, credential vault, and
/// webhook-event log
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
    emails: RwLock<HashMap<String, AccountId>>,
    purchases: RwLock<Vec<Purchase>>,
    credentials: RwLock<HashMap<(AccountId, String), SessionCredential>>,
    events: RwLock<Vec<WebhookEvent>>,
    next_account_id: AtomicI64,
    next_event_id: AtomicI64,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            emails: RwLock::new(HashMap::new()),
            purchases: RwLock::new(Vec::new()),
            credentials: RwLock::new(HashMap::new()),
            events: RwLock::new(Vec::new()),
            next_account_id: AtomicI64::new(1),
            next_event_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn create_or_update(&self, email: &str) -> StoreResult<Account> {
        let normalized = email.to_lowercase();
        // The email map is the authority; holding its write lock makes the
        // lookup-or-insert atomic under concurrent calls.
        let mut emails = self.emails.write().unwrap();

        if let Some(id) = emails.get(&normalized) {
            let accounts = self.accounts.read().unwrap();
            return accounts
                .get(id)
                .cloned()
                .ok_or_else(|| AppError::Internal("email index out of sync".into()));
        }

        let account = Account {
            id: AccountId(self.next_account_id.fetch_add(1, Ordering::SeqCst)),
            email: normalized.clone(),
            created_at: Utc::now(),
        };
        emails.insert(normalized, account.id);
        self.accounts
            .write()
            .unwrap()
            .insert(account.id, account.clone());

        Ok(account)
    }

    fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let normalized = email.to_lowercase();
        let emails = self.emails.read().unwrap();
        let accounts = self.accounts.read().unwrap();

        Ok(emails.get(&normalized).and_then(|id| accounts.get(id)).cloned())
    }

    fn find_by_id(&self, account_id: AccountId) -> StoreResult<Option<Account>> {
        Ok(self.accounts.read().unwrap().get(&account_id).cloned())
    }

    fn record_purchase(
        &self,
        account_id: AccountId,
        product_id: &str,
        transaction_id: &str,
    ) -> StoreResult<bool> {
        let mut purchases = self.purchases.write().unwrap();

        let already_applied = purchases.iter().any(|p| {
            p.account_id == account_id
                && p.product_id == product_id
                && p.transaction_id == transaction_id
        });
        if already_applied {
            return Ok(false);
        }

        purchases.push(Purchase {
            account_id,
            product_id: product_id.to_string(),
            transaction_id: transaction_id.to_string(),
            created_at: Utc::now(),
        });
        Ok(true)
    }

    fn purchases(&self, account_id: AccountId) -> StoreResult<Vec<String>> {
        Ok(self
            .purchases
            .read()
            .unwrap()
            .iter()
            .filter(|p| p.account_id == account_id)
            .map(|p| p.product_id.clone())
            .collect())
    }

    fn save_credential(
        &self,
        account_id: AccountId,
        session_name: &str,
        blob: &str,
    ) -> StoreResult<()> {
        self.credentials.write().unwrap().insert(
            (account_id, session_name.to_string()),
            SessionCredential {
                account_id,
                session_name: session_name.to_string(),
                blob: blob.to_string(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn credential_exists(&self, account_id: AccountId, session_name: &str) -> StoreResult<bool> {
        Ok(self
            .credentials
            .read()
            .unwrap()
            .contains_key(&(account_id, session_name.to_string())))
    }

    fn delete_credential(&self, account_id: AccountId, session_name: &str) -> StoreResult<()> {
        self.credentials
            .write()
            .unwrap()
            .remove(&(account_id, session_name.to_string()))
            .map(|_| ())
            .ok_or(AppError::CredentialNotFound)
    }
}

impl EventLog for InMemoryAccountStore {
    fn append_event(&self, event_id: &str, event_type: &str, payload: &str) -> StoreResult<bool> {
        let mut events = self.events.write().unwrap();

        if events.iter().any(|e| e.event_id == event_id) {
            return Ok(false);
        }

        events.push(WebhookEvent {
            id: self.next_event_id.fetch_add(1, Ordering::SeqCst),
            event_id: event_id.to_string(),
            event_type: event_type.to_string(),
            payload: payload.to_string(),
            status: EventStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    fn claim_pending(&self, max_attempts: u32, limit: u32) -> StoreResult<Vec<WebhookEvent>> {
        let mut events = self.events.write().unwrap();
        let mut claimed = Vec::new();

        for event in events.iter_mut() {
            if claimed.len() as u32 >= limit {
                break;
            }
            if event.status == EventStatus::Pending && event.attempts < max_attempts {
                event.status = EventStatus::Inflight;
                event.attempts += 1;
                claimed.push(event.clone());
            }
        }

        Ok(claimed)
    }

    fn mark_processed(&self, id: i64) -> StoreResult<()> {
        let mut events = self.events.write().unwrap();
        if let Some(event) = events.iter_mut().find(|e| e.id == id) {
            event.status = EventStatus::Processed;
            event.last_error = None;
        }
        Ok(())
    }

    fn mark_failed(&self, id: i64, error: &str, max_attempts: u32) -> StoreResult<()> {
        let mut events = self.events.write().unwrap();
        if let Some(event) = events.iter_mut().find(|e| e.id == id) {
            event.status = if event.attempts >= max_attempts {
                EventStatus::Dead
            } else {
                EventStatus::Pending
            };
            event.last_error = Some(error.to_string());
        }
        Ok(())
    }

    fn recover_inflight(&self) -> StoreResult<u64> {
        let mut events = self.events.write().unwrap();
        let mut recovered = 0;
        for event in events.iter_mut() {
            if event.status == EventStatus::Inflight {
                event.status = EventStatus::Pending;
                recovered += 1;
            }
        }
        Ok(recovered)
    }

    fn find_event(&self, event_id: &str) -> StoreResult<Option<WebhookEvent>> {
        Ok(self
            .events
            .read()
            .unwrap()
            .iter()
            .find(|e| e.event_id == event_id)
            .cloned())
    }
}

/// In-memory bucket, contact, and template store
#[derive(Default)]
pub struct InMemoryLeadStore {
    buckets: RwLock<Vec<Bucket>>,
    contacts: RwLock<Vec<Contact>>,
    templates: RwLock<Vec<MessageTemplate>>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeadStore for InMemoryLeadStore {
    fn create_bucket(&self, name: &str, owner_id: AccountId) -> StoreResult<Bucket> {
        let bucket = Bucket {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            owner_id,
            created_at: Utc::now(),
        };
        self.buckets.write().unwrap().push(bucket.clone());
        Ok(bucket)
    }

    fn list_buckets(&self) -> StoreResult<Vec<BucketSummary>> {
        let buckets = self.buckets.read().unwrap();
        let contacts = self.contacts.read().unwrap();

        Ok(buckets
            .iter()
            .map(|bucket| BucketSummary {
                bucket: bucket.clone(),
                contact_count: contacts.iter().filter(|c| c.bucket_id == bucket.id).count()
                    as u64,
            })
            .collect())
    }

    fn find_bucket(&self, bucket_id: &str) -> StoreResult<Option<Bucket>> {
        Ok(self
            .buckets
            .read()
            .unwrap()
            .iter()
            .find(|b| b.id == bucket_id)
            .cloned())
    }

    fn bucket_contacts(&self, bucket_id: &str) -> StoreResult<Vec<Contact>> {
        Ok(self
            .contacts
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.bucket_id == bucket_id)
            .cloned()
            .collect())
    }

    fn export_batch(
        &self,
        bucket_id: &str,
        candidates: &[CandidateContact],
    ) -> StoreResult<ExportOutcome> {
        if self.find_bucket(bucket_id)?.is_none() {
            return Err(AppError::BucketNotFound);
        }

        // One write lock for the whole batch keeps it atomic for readers
        let mut contacts = self.contacts.write().unwrap();
        let mut outcome = ExportOutcome::default();

        for candidate in candidates {
            if candidate.whatsapp_id.is_empty() {
                outcome.rejected += 1;
                continue;
            }

            match contacts
                .iter_mut()
                .find(|c| c.whatsapp_id == candidate.whatsapp_id && c.bucket_id == bucket_id)
            {
                Some(existing) => {
                    existing.name = candidate.name.clone();
                    existing.phone_number = candidate.phone_number.clone();
                    existing.group_id = candidate.group_id.clone();
                    existing.group_name = candidate.group_name.clone();
                    outcome.skipped += 1;
                }
                None => {
                    contacts.push(Contact {
                        id: Uuid::new_v4().to_string(),
                        whatsapp_id: candidate.whatsapp_id.clone(),
                        name: candidate.name.clone(),
                        phone_number: candidate.phone_number.clone(),
                        group_id: candidate.group_id.clone(),
                        group_name: candidate.group_name.clone(),
                        bucket_id: bucket_id.to_string(),
                    });
                    outcome.added += 1;
                }
            }
        }

        Ok(outcome)
    }

    fn create_template(&self, title: &str, message: &str) -> StoreResult<MessageTemplate> {
        let template = MessageTemplate {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
        };
        self.templates.write().unwrap().push(template.clone());
        Ok(template)
    }

    fn list_templates(&self) -> StoreResult<Vec<MessageTemplate>> {
        Ok(self.templates.read().unwrap().clone())
    }

    fn find_template(&self, template_id: &str) -> StoreResult<Option<MessageTemplate>> {
        Ok(self
            .templates
            .read()
            .unwrap()
            .iter()
            .find(|t| t.id == template_id)
            .cloned())
    }

    fn update_template(
        &self,
        template_id: &str,
        title: &str,
        message: &str,
    ) -> StoreResult<MessageTemplate> {
        let mut templates = self.templates.write().unwrap();

        let template = templates
            .iter_mut()
            .find(|t| t.id == template_id)
            .ok_or(AppError::TemplateNotFound)?;
        template.title = title.to_string();
        template.message = message.to_string();

        Ok(template.clone())
    }

    fn delete_template(&self, template_id: &str) -> StoreResult<()> {
        let mut templates = self.templates.write().unwrap();

        let before = templates.len();
        templates.retain(|t| t.id != template_id);
        if templates.len() == before {
            return Err(AppError::TemplateNotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrent_upserts_resolve_to_one_account() {
        use std::sync::Arc;

        let store = Arc::new(InMemoryAccountStore::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.create_or_update("race@example.com").unwrap().id
            }));
        }

        let ids: Vec<AccountId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn claim_is_exclusive() {
        let store = InMemoryAccountStore::new();
        store.append_event("evt_1", "checkout.session.completed", "{}").unwrap();

        let first = store.claim_pending(5, 10).unwrap();
        let second = store.claim_pending(5, 10).unwrap();

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }
}
