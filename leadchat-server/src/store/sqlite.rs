//! SQLite-based storage implementation

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{
    Account, AccountId, AccountStore, Bucket, BucketSummary, CandidateContact, Contact,
    EventLog, EventStatus, ExportOutcome, LeadStore, MessageTemplate, StoreResult, WebhookEvent,
};
use crate::error::AppError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// SQLite-based store implementing AccountStore, EventLog, and LeadStore
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, AppError> {
        let conn = Connection::open(path).map_err(|e| AppError::Internal(e.to_string()))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Self::migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run database migrations
    fn migrate(conn: &Connection) -> Result<(), AppError> {
        let current_version = Self::get_schema_version(conn)?;

        if current_version < SCHEMA_VERSION {
            tracing::info!(
                current = current_version,
                target = SCHEMA_VERSION,
                "Running database migrations"
            );

            if current_version < 1 {
                Self::migrate_v1(conn)?;
            }

            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .map_err(|e| AppError::Internal(e.to_string()))?;

            tracing::info!("Database migrations complete");
        }

        Ok(())
    }

    /// Get current schema version (0 if no schema exists)
    fn get_schema_version(conn: &Connection) -> Result<i32, AppError> {
        let table_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
                [],
                |row| row.get(0),
            )
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if !table_exists {
            return Ok(0);
        }

        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0).map(|v| v.unwrap_or(0))
        })
        .map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Migration to version 1: initial schema
    fn migrate_v1(conn: &Connection) -> Result<(), AppError> {
        conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Accounts, keyed by unique email
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            );

            -- Purchase ledger; the triple is the idempotency key
            CREATE TABLE IF NOT EXISTS purchases (
                account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                product_id TEXT NOT NULL,
                transaction_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(account_id, product_id, transaction_id)
            );
            CREATE INDEX IF NOT EXISTS idx_purchases_account ON purchases(account_id);

            -- Opaque messaging-session blobs, one per (account, name)
            CREATE TABLE IF NOT EXISTS session_credentials (
                account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                session_name TEXT NOT NULL,
                blob TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (account_id, session_name)
            );

            -- Contact buckets
            CREATE TABLE IF NOT EXISTS buckets (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                owner_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL
            );

            -- Harvested contacts, deduplicated per bucket by external id
            CREATE TABLE IF NOT EXISTS contacts (
                id TEXT PRIMARY KEY,
                whatsapp_id TEXT NOT NULL,
                name TEXT NOT NULL,
                phone_number TEXT NOT NULL,
                group_id TEXT NOT NULL,
                group_name TEXT NOT NULL,
                bucket_id TEXT NOT NULL REFERENCES buckets(id) ON DELETE CASCADE,
                UNIQUE(whatsapp_id, bucket_id)
            );
            CREATE INDEX IF NOT EXISTS idx_contacts_bucket ON contacts(bucket_id);

            -- Outbound message templates
            CREATE TABLE IF NOT EXISTS message_templates (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                message TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Commit log of verified provider events
            CREATE TABLE IF NOT EXISTS webhook_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                event_id TEXT NOT NULL UNIQUE,
                event_type TEXT NOT NULL,
                payload TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                attempts INTEGER NOT NULL DEFAULT 0,
                last_error TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_webhook_events_status ON webhook_events(status);
            "#,
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(())
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn map_account(row: &Row<'_>) -> rusqlite::Result<Account> {
    let id: i64 = row.get(0)?;
    let email: String = row.get(1)?;
    let created_at: String = row.get(2)?;
    Ok(Account {
        id: AccountId(id),
        email,
        created_at: parse_timestamp(&created_at),
    })
}

fn map_bucket(row: &Row<'_>) -> rusqlite::Result<Bucket> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let owner_id: i64 = row.get(2)?;
    let created_at: String = row.get(3)?;
    Ok(Bucket {
        id,
        name,
        owner_id: AccountId(owner_id),
        created_at: parse_timestamp(&created_at),
    })
}

fn map_contact(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        whatsapp_id: row.get(1)?,
        name: row.get(2)?,
        phone_number: row.get(3)?,
        group_id: row.get(4)?,
        group_name: row.get(5)?,
        bucket_id: row.get(6)?,
    })
}

fn map_template(row: &Row<'_>) -> rusqlite::Result<MessageTemplate> {
    let id: String = row.get(0)?;
    let title: String = row.get(1)?;
    let message: String = row.get(2)?;
    let created_at: String = row.get(3)?;
    Ok(MessageTemplate {
        id,
        title,
        message,
        created_at: parse_timestamp(&created_at),
    })
}

fn map_event(row: &Row<'_>) -> rusqlite::Result<WebhookEvent> {
    let id: i64 = row.get(0)?;
    let event_id: String = row.get(1)?;
    let event_type: String = row.get(2)?;
    let payload: String = row.get(3)?;
    let status: String = row.get(4)?;
    let attempts: u32 = row.get(5)?;
    let last_error: Option<String> = row.get(6)?;
    let created_at: String = row.get(7)?;
    Ok(WebhookEvent {
        id,
        event_id,
        event_type,
        payload,
        status: EventStatus::from_str(&status).unwrap_or(EventStatus::Pending),
        attempts,
        last_error,
        created_at: parse_timestamp(&created_at),
    })
}

impl AccountStore for SqliteStore {
    fn create_or_update(&self, email: &str) -> StoreResult<Account> {
        let normalized = email.to_lowercase();
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        // Single-statement upsert on the unique email: two racing calls for
        // the same address resolve to the same row, never two accounts.
        conn.query_row(
            "INSERT INTO accounts (email, created_at) VALUES (?1, ?2)
             ON CONFLICT(email) DO UPDATE SET email = excluded.email
             RETURNING id, email, created_at",
            params![normalized, now],
            map_account,
        )
        .map_err(|e| AppError::Internal(e.to_string()))
    }

    fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let normalized = email.to_lowercase();
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, email, created_at FROM accounts WHERE email = ?1",
            params![normalized],
            map_account,
        )
        .optional()
        .map_err(|e| AppError::Internal(e.to_string()))
    }

    fn find_by_id(&self, account_id: AccountId) -> StoreResult<Option<Account>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, email, created_at FROM accounts WHERE id = ?1",
            params![account_id.0],
            map_account,
        )
        .optional()
        .map_err(|e| AppError::Internal(e.to_string()))
    }

    fn record_purchase(
        &self,
        account_id: AccountId,
        product_id: &str,
        transaction_id: &str,
    ) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO purchases (account_id, product_id, transaction_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![account_id.0, product_id, transaction_id, now],
            )
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(inserted > 0)
    }

    fn purchases(&self, account_id: AccountId) -> StoreResult<Vec<String>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT product_id FROM purchases WHERE account_id = ?1 ORDER BY rowid")
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let products = stmt
            .query_map(params![account_id.0], |row| row.get(0))
            .map_err(|e| AppError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(products)
    }

    fn save_credential(
        &self,
        account_id: AccountId,
        session_name: &str,
        blob: &str,
    ) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO session_credentials (account_id, session_name, blob, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(account_id, session_name)
             DO UPDATE SET blob = excluded.blob, updated_at = excluded.updated_at",
            params![account_id.0, session_name, blob, now],
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(())
    }

    fn credential_exists(&self, account_id: AccountId, session_name: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM session_credentials
                 WHERE account_id = ?1 AND session_name = ?2",
                params![account_id.0, session_name],
                |row| row.get(0),
            )
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(count > 0)
    }

    fn delete_credential(&self, account_id: AccountId, session_name: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn
            .execute(
                "DELETE FROM session_credentials WHERE account_id = ?1 AND session_name = ?2",
                params![account_id.0, session_name],
            )
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if rows_affected == 0 {
            return Err(AppError::CredentialNotFound);
        }

        Ok(())
    }
}

impl EventLog for SqliteStore {
    fn append_event(&self, event_id: &str, event_type: &str, payload: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO webhook_events (event_id, event_type, payload, status, created_at)
                 VALUES (?1, ?2, ?3, 'pending', ?4)",
                params![event_id, event_type, payload, now],
            )
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(inserted > 0)
    }

    fn claim_pending(&self, max_attempts: u32, limit: u32) -> StoreResult<Vec<WebhookEvent>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "UPDATE webhook_events
                 SET status = 'inflight', attempts = attempts + 1
                 WHERE id IN (
                     SELECT id FROM webhook_events
                     WHERE status = 'pending' AND attempts < ?1
                     ORDER BY id LIMIT ?2
                 )
                 RETURNING id, event_id, event_type, payload, status, attempts, last_error, created_at",
            )
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let events = stmt
            .query_map(params![max_attempts, limit], map_event)
            .map_err(|e| AppError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(events)
    }

    fn mark_processed(&self, id: i64) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "UPDATE webhook_events SET status = 'processed', last_error = NULL WHERE id = ?1",
            params![id],
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(())
    }

    fn mark_failed(&self, id: i64, error: &str, max_attempts: u32) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "UPDATE webhook_events
             SET status = CASE WHEN attempts >= ?2 THEN 'dead' ELSE 'pending' END,
                 last_error = ?3
             WHERE id = ?1",
            params![id, max_attempts, error],
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(())
    }

    fn recover_inflight(&self) -> StoreResult<u64> {
        let conn = self.conn.lock().unwrap();

        let rows = conn
            .execute(
                "UPDATE webhook_events SET status = 'pending' WHERE status = 'inflight'",
                [],
            )
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(rows as u64)
    }

    fn find_event(&self, event_id: &str) -> StoreResult<Option<WebhookEvent>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, event_id, event_type, payload, status, attempts, last_error, created_at
             FROM webhook_events WHERE event_id = ?1",
            params![event_id],
            map_event,
        )
        .optional()
        .map_err(|e| AppError::Internal(e.to_string()))
    }
}

impl LeadStore for SqliteStore {
    fn create_bucket(&self, name: &str, owner_id: AccountId) -> StoreResult<Bucket> {
        let conn = self.conn.lock().unwrap();
        let bucket = Bucket {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            owner_id,
            created_at: Utc::now(),
        };

        conn.execute(
            "INSERT INTO buckets (id, name, owner_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                bucket.id,
                bucket.name,
                bucket.owner_id.0,
                bucket.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            if let rusqlite::Error::SqliteFailure(ref err, _) = e {
                if err.code == rusqlite::ErrorCode::ConstraintViolation {
                    return AppError::AccountNotFound;
                }
            }
            AppError::Internal(e.to_string())
        })?;

        Ok(bucket)
    }

    fn list_buckets(&self) -> StoreResult<Vec<BucketSummary>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT b.id, b.name, b.owner_id, b.created_at,
                        (SELECT COUNT(*) FROM contacts c WHERE c.bucket_id = b.id)
                 FROM buckets b ORDER BY b.created_at",
            )
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let buckets = stmt
            .query_map([], |row| {
                let bucket = map_bucket(row)?;
                let contact_count: i64 = row.get(4)?;
                Ok(BucketSummary {
                    bucket,
                    contact_count: contact_count as u64,
                })
            })
            .map_err(|e| AppError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(buckets)
    }

    fn find_bucket(&self, bucket_id: &str) -> StoreResult<Option<Bucket>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, name, owner_id, created_at FROM buckets WHERE id = ?1",
            params![bucket_id],
            map_bucket,
        )
        .optional()
        .map_err(|e| AppError::Internal(e.to_string()))
    }

    fn bucket_contacts(&self, bucket_id: &str) -> StoreResult<Vec<Contact>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT id, whatsapp_id, name, phone_number, group_id, group_name, bucket_id
                 FROM contacts WHERE bucket_id = ?1 ORDER BY rowid",
            )
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let contacts = stmt
            .query_map(params![bucket_id], map_contact)
            .map_err(|e| AppError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(contacts)
    }

    fn export_batch(
        &self,
        bucket_id: &str,
        candidates: &[CandidateContact],
    ) -> StoreResult<ExportOutcome> {
        let mut conn = self.conn.lock().unwrap();

        let bucket_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM buckets WHERE id = ?1)",
                params![bucket_id],
                |row| row.get(0),
            )
            .map_err(|e| AppError::Internal(e.to_string()))?;
        if !bucket_exists {
            return Err(AppError::BucketNotFound);
        }

        // One transaction per batch: readers see pre- or post-batch state,
        // and any failure rolls the whole batch back.
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let mut outcome = ExportOutcome::default();

        for candidate in candidates {
            if candidate.whatsapp_id.is_empty() {
                outcome.rejected += 1;
                continue;
            }

            let existing: Option<String> = tx
                .query_row(
                    "SELECT id FROM contacts WHERE whatsapp_id = ?1 AND bucket_id = ?2",
                    params![candidate.whatsapp_id, bucket_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| AppError::Internal(e.to_string()))?;

            match existing {
                Some(contact_id) => {
                    // Last write wins on the mutable fields
                    tx.execute(
                        "UPDATE contacts
                         SET name = ?2, phone_number = ?3, group_id = ?4, group_name = ?5
                         WHERE id = ?1",
                        params![
                            contact_id,
                            candidate.name,
                            candidate.phone_number,
                            candidate.group_id,
                            candidate.group_name,
                        ],
                    )
                    .map_err(|e| AppError::Internal(e.to_string()))?;
                    outcome.skipped += 1;
                }
                None => {
                    tx.execute(
                        "INSERT INTO contacts
                         (id, whatsapp_id, name, phone_number, group_id, group_name, bucket_id)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                        params![
                            Uuid::new_v4().to_string(),
                            candidate.whatsapp_id,
                            candidate.name,
                            candidate.phone_number,
                            candidate.group_id,
                            candidate.group_name,
                            bucket_id,
                        ],
                    )
                    .map_err(|e| AppError::Internal(e.to_string()))?;
                    outcome.added += 1;
                }
            }
        }

        tx.commit().map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(outcome)
    }

    fn create_template(&self, title: &str, message: &str) -> StoreResult<MessageTemplate> {
        let conn = self.conn.lock().unwrap();
        let template = MessageTemplate {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
        };

        conn.execute(
            "INSERT INTO message_templates (id, title, message, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                template.id,
                template.title,
                template.message,
                template.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(template)
    }

    fn list_templates(&self) -> StoreResult<Vec<MessageTemplate>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT id, title, message, created_at FROM message_templates ORDER BY created_at",
            )
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let templates = stmt
            .query_map([], map_template)
            .map_err(|e| AppError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(templates)
    }

    fn find_template(&self, template_id: &str) -> StoreResult<Option<MessageTemplate>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, title, message, created_at FROM message_templates WHERE id = ?1",
            params![template_id],
            map_template,
        )
        .optional()
        .map_err(|e| AppError::Internal(e.to_string()))
    }

    fn update_template(
        &self,
        template_id: &str,
        title: &str,
        message: &str,
    ) -> StoreResult<MessageTemplate> {
        {
            let conn = self.conn.lock().unwrap();

            let rows_affected = conn
                .execute(
                    "UPDATE message_templates SET title = ?2, message = ?3 WHERE id = ?1",
                    params![template_id, title, message],
                )
                .map_err(|e| AppError::Internal(e.to_string()))?;

            if rows_affected == 0 {
                return Err(AppError::TemplateNotFound);
            }
        }

        self.find_template(template_id)?
            .ok_or(AppError::TemplateNotFound)
    }

    fn delete_template(&self, template_id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn
            .execute(
                "DELETE FROM message_templates WHERE id = ?1",
                params![template_id],
            )
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if rows_affected == 0 {
            return Err(AppError::TemplateNotFound);
        }

        Ok(())
    }
}

// Implement the traits for Arc<SqliteStore> so one store can back both the
// account and lead sides of the app state.
impl AccountStore for std::sync::Arc<SqliteStore> {
    fn create_or_update(&self, email: &str) -> StoreResult<Account> {
        (**self).create_or_update(email)
    }

    fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        (**self).find_by_email(email)
    }

    fn find_by_id(&self, account_id: AccountId) -> StoreResult<Option<Account>> {
        (**self).find_by_id(account_id)
    }

    fn record_purchase(
        &self,
        account_id: AccountId,
        product_id: &str,
        transaction_id: &str,
    ) -> StoreResult<bool> {
        (**self).record_purchase(account_id, product_id, transaction_id)
    }

    fn purchases(&self, account_id: AccountId) -> StoreResult<Vec<String>> {
        (**self).purchases(account_id)
    }

    fn save_credential(
        &self,
        account_id: AccountId,
        session_name: &str,
        blob: &str,
    ) -> StoreResult<()> {
        (**self).save_credential(account_id, session_name, blob)
    }

    fn credential_exists(&self, account_id: AccountId, session_name: &str) -> StoreResult<bool> {
        (**self).credential_exists(account_id, session_name)
    }

    fn delete_credential(&self, account_id: AccountId, session_name: &str) -> StoreResult<()> {
        (**self).delete_credential(account_id, session_name)
    }
}

impl EventLog for std::sync::Arc<SqliteStore> {
    fn append_event(&self, event_id: &str, event_type: &str, payload: &str) -> StoreResult<bool> {
        (**self).append_event(event_id, event_type, payload)
    }

    fn claim_pending(&self, max_attempts: u32, limit: u32) -> StoreResult<Vec<WebhookEvent>> {
        (**self).claim_pending(max_attempts, limit)
    }

    fn mark_processed(&self, id: i64) -> StoreResult<()> {
        (**self).mark_processed(id)
    }

    fn mark_failed(&self, id: i64, error: &str, max_attempts: u32) -> StoreResult<()> {
        (**self).mark_failed(id, error, max_attempts)
    }

    fn recover_inflight(&self) -> StoreResult<u64> {
        (**self).recover_inflight()
    }

    fn find_event(&self, event_id: &str) -> StoreResult<Option<WebhookEvent>> {
        (**self).find_event(event_id)
    }
}

impl LeadStore for std::sync::Arc<SqliteStore> {
    fn create_bucket(&self, name: &str, owner_id: AccountId) -> StoreResult<Bucket> {
        (**self).create_bucket(name, owner_id)
    }

    fn list_buckets(&self) -> StoreResult<Vec<BucketSummary>> {
        (**self).list_buckets()
    }

    fn find_bucket(&self, bucket_id: &str) -> StoreResult<Option<Bucket>> {
        (**self).find_bucket(bucket_id)
    }

    fn bucket_contacts(&self, bucket_id: &str) -> StoreResult<Vec<Contact>> {
        (**self).bucket_contacts(bucket_id)
    }

    fn export_batch(
        &self,
        bucket_id: &str,
        candidates: &[CandidateContact],
    ) -> StoreResult<ExportOutcome> {
        (**self).export_batch(bucket_id, candidates)
    }

    fn create_template(&self, title: &str, message: &str) -> StoreResult<MessageTemplate> {
        (**self).create_template(title, message)
    }

    fn list_templates(&self) -> StoreResult<Vec<MessageTemplate>> {
        (**self).list_templates()
    }

    fn find_template(&self, template_id: &str) -> StoreResult<Option<MessageTemplate>> {
        (**self).find_template(template_id)
    }

    fn update_template(
        &self,
        template_id: &str,
        title: &str,
        message: &str,
    ) -> StoreResult<MessageTemplate> {
        (**self).update_template(template_id, title, message)
    }

    fn delete_template(&self, template_id: &str) -> StoreResult<()> {
        (**self).delete_template(template_id)
    }
}
