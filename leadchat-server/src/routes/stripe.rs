//! Payment provider endpoints

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::email::EmailSender;
use crate::error::AppError;
use crate::payments::{EventEnvelope, PaymentProvider};
use crate::reconciler;
use crate::state::AppState;
use crate::store::{AccountStore, EventLog, LeadStore};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    pub price_id: String,
}

#[derive(Serialize)]
pub struct CreateCheckoutSessionResponse {
    pub id: String,
}

/// POST /stripe/create-checkout-session
pub async fn create_checkout_session<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
    Json(req): Json<CreateCheckoutSessionRequest>,
) -> Result<Json<CreateCheckoutSessionResponse>, AppError>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    if req.price_id.is_empty() {
        return Err(AppError::Validation("priceId is required".into()));
    }

    let session = state
        .payments
        .create_checkout_session(&req.price_id)
        .await
        .map_err(|e| AppError::Dependency(e.to_string()))?;

    Ok(Json(CreateCheckoutSessionResponse { id: session.id }))
}

#[derive(Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// POST /stripe/webhook
///
/// Verifies the signature over the exact raw bytes, durably records the
/// event, and acknowledges. Side effects run in the reconciler; a handler
/// bug here can no longer eat an entitlement while still returning 200.
pub async fn webhook<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError>
where
    A: AccountStore + EventLog + 'static,
    L: LeadStore + 'static,
    E: EmailSender + 'static,
    P: PaymentProvider + 'static,
{
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::InvalidWebhookSignature)?;

    leadchat_core::verify_signature(&body, signature, &state.webhook_secret)
        .map_err(|_| AppError::InvalidWebhookSignature)?;

    let envelope = EventEnvelope::parse(&body)
        .map_err(|e| AppError::Validation(format!("unparseable event: {e}")))?;

    let appended = state.accounts.append_event(
        &envelope.event_id,
        &envelope.event_type,
        &String::from_utf8_lossy(&body),
    )?;
    if appended {
        tracing::info!(
            event_id = %envelope.event_id,
            event_type = %envelope.event_type,
            "Webhook event logged"
        );
        // Nudge the reconciler; the sweeper covers retries
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = reconciler::process_pending(&state).await {
                tracing::error!(error = %e, "Post-webhook reconcile failed");
            }
        });
    } else {
        tracing::info!(event_id = %envelope.event_id, "Duplicate webhook delivery ignored");
    }

    Ok(Json(WebhookAck { received: true }))
}
