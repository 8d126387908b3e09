//! Contact export endpoint (the dedup engine's HTTP surface)

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::email::EmailSender;
use crate::error::AppError;
use crate::payments::PaymentProvider;
use crate::state::AppState;
use crate::store::{AccountStore, CandidateContact, EventLog, LeadStore};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportCandidate {
    /// External messaging-platform identifier (the dedup key)
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub group_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub bucket_id: String,
    pub contacts: Vec<ExportCandidate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub message: String,
    pub added_contacts: u64,
    pub skipped_contacts: u64,
    pub rejected_contacts: u64,
}

/// POST /export
pub async fn export_contacts<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
    Json(req): Json<ExportRequest>,
) -> Result<Json<ExportResponse>, AppError>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    if req.bucket_id.is_empty() {
        return Err(AppError::Validation("bucketId is required".into()));
    }

    let candidates: Vec<CandidateContact> = req
        .contacts
        .into_iter()
        .map(|c| CandidateContact {
            whatsapp_id: c.id,
            name: c.name,
            phone_number: c.phone_number,
            group_id: c.group_id,
            group_name: c.group_name,
        })
        .collect();

    let outcome = state.leads.export_batch(&req.bucket_id, &candidates)?;

    tracing::info!(
        bucket_id = %req.bucket_id,
        added = outcome.added,
        skipped = outcome.skipped,
        rejected = outcome.rejected,
        "Export batch applied"
    );

    Ok(Json(ExportResponse {
        message: "Contacts exported successfully".to_string(),
        added_contacts: outcome.added,
        skipped_contacts: outcome.skipped,
        rejected_contacts: outcome.rejected,
    }))
}
