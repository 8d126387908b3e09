//! Session credential vault endpoints
//!
//! Persists opaque messaging-session blobs so a login can be resumed
//! without re-authenticating interactively.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::email::EmailSender;
use crate::error::AppError;
use crate::payments::PaymentProvider;
use crate::state::AppState;
use crate::store::{AccountId, AccountStore, EventLog, LeadStore};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSessionRequest {
    pub account_id: i64,
    pub session_name: String,
    /// Opaque session blob from the messaging client
    pub payload: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// POST /whatsapp-auth/save
pub async fn save_session<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
    Json(req): Json<SaveSessionRequest>,
) -> Result<Json<SuccessResponse>, AppError>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    if req.session_name.is_empty() {
        return Err(AppError::Validation("sessionName is required".into()));
    }
    if req.payload.is_empty() {
        return Err(AppError::Validation("payload is required".into()));
    }

    let account = state
        .accounts
        .find_by_id(AccountId(req.account_id))?
        .ok_or(AppError::AccountNotFound)?;

    state
        .accounts
        .save_credential(account.id, &req.session_name, &req.payload)?;

    tracing::info!(
        account_id = account.id.0,
        session_name = %req.session_name,
        "Session credential saved"
    );

    Ok(Json(SuccessResponse { success: true }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQueryRequest {
    pub account_id: i64,
    pub session_name: String,
}

#[derive(Serialize)]
pub struct VerifySessionResponse {
    pub valid: bool,
}

/// POST /whatsapp-auth/verify
///
/// A presence check against the persisted record; the blob's internal
/// validity is not inspected.
pub async fn verify_session<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
    Json(req): Json<SessionQueryRequest>,
) -> Result<Json<VerifySessionResponse>, AppError>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    if req.session_name.is_empty() {
        return Err(AppError::Validation("sessionName is required".into()));
    }

    let valid = state
        .accounts
        .credential_exists(AccountId(req.account_id), &req.session_name)?;

    Ok(Json(VerifySessionResponse { valid }))
}

#[derive(Serialize)]
pub struct SessionExistsResponse {
    pub exists: bool,
}

/// POST /whatsapp-auth/session-exists
pub async fn session_exists<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
    Json(req): Json<SessionQueryRequest>,
) -> Result<Json<SessionExistsResponse>, AppError>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    if req.session_name.is_empty() {
        return Err(AppError::Validation("sessionName is required".into()));
    }

    let exists = state
        .accounts
        .credential_exists(AccountId(req.account_id), &req.session_name)?;

    Ok(Json(SessionExistsResponse { exists }))
}

/// DELETE /whatsapp-auth/{account_id}/{session_name}
pub async fn delete_session<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
    Path((account_id, session_name)): Path<(i64, String)>,
) -> Result<Json<SuccessResponse>, AppError>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    state
        .accounts
        .delete_credential(AccountId(account_id), &session_name)?;

    tracing::info!(account_id, session_name = %session_name, "Session credential deleted");

    Ok(Json(SuccessResponse { success: true }))
}
