//! Payment event reconciler
//!
//! Consumes the webhook commit log and drives identity mutations. The
//! webhook handler only verifies and records events; everything with side
//! effects happens here, asynchronously, with bounded retries. A failed
//! event returns to pending and is retried by the sweeper; after
//! `MAX_ATTEMPTS` it is dead-lettered with its error for manual inspection.

use std::sync::Arc;
use std::time::Duration;

use crate::email::EmailSender;
use crate::payments::{EventEnvelope, PaymentEventKind, PaymentProvider};
use crate::state::AppState;
use crate::store::{AccountStore, EventLog, LeadStore, StoreResult, WebhookEvent};

/// Processing attempts before an event is dead-lettered
pub const MAX_ATTEMPTS: u32 = 5;

/// Events claimed per processing pass
const CLAIM_BATCH: u32 = 16;

/// Drain and process all pending events; returns how many were processed.
pub async fn process_pending<A, L, E, P>(state: &AppState<A, L, E, P>) -> StoreResult<u64>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    let mut processed = 0;

    loop {
        let claimed = state.accounts.claim_pending(MAX_ATTEMPTS, CLAIM_BATCH)?;
        if claimed.is_empty() {
            break;
        }

        for event in claimed {
            match apply(state, &event).await {
                Ok(()) => {
                    state.accounts.mark_processed(event.id)?;
                    processed += 1;
                }
                Err(error) => {
                    tracing::warn!(
                        event_id = %event.event_id,
                        attempts = event.attempts,
                        error = %error,
                        "Event processing failed"
                    );
                    state.accounts.mark_failed(event.id, &error, MAX_ATTEMPTS)?;
                }
            }
        }
    }

    Ok(processed)
}

/// Apply one logged event's side effects
async fn apply<A, L, E, P>(
    state: &AppState<A, L, E, P>,
    event: &WebhookEvent,
) -> Result<(), String>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    let envelope = EventEnvelope::parse(event.payload.as_bytes())
        .map_err(|e| format!("unparseable event payload: {e}"))?;

    match envelope.kind() {
        kind if kind.is_entitling() => {
            let session_id = envelope
                .session_id
                .as_deref()
                .ok_or("event has no checkout session id")?;

            // Provider truth first: the purchase is recorded only after
            // this lookup succeeds, so a timeout here leaves nothing applied.
            let details = state
                .payments
                .fetch_checkout_session(session_id)
                .await
                .map_err(|e| e.to_string())?;

            let email = details.payer_email.ok_or("session has no payer email")?;
            let product_id = details.product_id.ok_or("session has no product")?;

            let account = state
                .accounts
                .create_or_update(&email)
                .map_err(|e| e.to_string())?;

            let added = state
                .accounts
                .record_purchase(account.id, &product_id, session_id)
                .map_err(|e| e.to_string())?;
            if !added {
                tracing::info!(
                    account_id = account.id.0,
                    transaction_id = %session_id,
                    "Purchase already applied, skipping append"
                );
            }

            let token = state
                .tokens
                .issue_magic_token(account.id.0)
                .map_err(|e| e.to_string())?;
            state
                .email
                .send_magic_link(&account.email, &state.magic_link_url(&token))?;

            tracing::info!(
                account_id = account.id.0,
                product_id = %product_id,
                transaction_id = %session_id,
                "Entitlement reconciled"
            );
            Ok(())
        }
        PaymentEventKind::Expired | PaymentEventKind::AsyncPaymentFailed => {
            // Terminal outcomes with no state to mutate
            tracing::info!(
                event_id = %envelope.event_id,
                event_type = %envelope.event_type,
                "Terminal payment event, no mutation"
            );
            Ok(())
        }
        _ => {
            tracing::info!(
                event_id = %envelope.event_id,
                event_type = %envelope.event_type,
                "Unrecognized event type acknowledged"
            );
            Ok(())
        }
    }
}

/// Periodically retry pending events (transient provider or mail failures)
pub fn spawn_sweeper<A, L, E, P>(
    state: Arc<AppState<A, L, E, P>>,
    interval: Duration,
) -> tokio::task::JoinHandle<()>
where
    A: AccountStore + EventLog + 'static,
    L: LeadStore + 'static,
    E: EmailSender + 'static,
    P: PaymentProvider + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so startup recovery
        // (recover_inflight) settles first.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match process_pending(&state).await {
                Ok(0) => {}
                Ok(count) => tracing::info!(count, "Reconciled payment events"),
                Err(e) => tracing::error!(error = %e, "Reconciler sweep failed"),
            }
        }
    })
}
