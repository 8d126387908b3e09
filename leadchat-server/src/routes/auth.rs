//! Magic-link authentication endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::email::EmailSender;
use crate::error::AppError;
use crate::payments::PaymentProvider;
use crate::state::AppState;
use crate::store::{AccountId, AccountStore, EventLog, LeadStore};

#[derive(Deserialize)]
pub struct SendMagicLinkRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct SendMagicLinkResponse {
    pub message: String,
}

/// POST /auth/send-magic-link
pub async fn send_magic_link<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
    Json(req): Json<SendMagicLinkRequest>,
) -> Result<Json<SendMagicLinkResponse>, AppError>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    if req.email.is_empty() {
        return Err(AppError::Validation("email is required".into()));
    }

    let account = state
        .accounts
        .find_by_email(&req.email)?
        .ok_or(AppError::AccountNotFound)?;

    let token = state
        .tokens
        .issue_magic_token(account.id.0)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // This is a synchronous user-facing action, so a mail failure surfaces
    // to the caller instead of being swallowed.
    state
        .email
        .send_magic_link(&account.email, &state.magic_link_url(&token))
        .map_err(AppError::Dependency)?;

    tracing::info!(account_id = account.id.0, "Magic link issued");

    Ok(Json(SendMagicLinkResponse {
        message: "Magic link sent".to_string(),
    }))
}

#[derive(Deserialize)]
pub struct VerifyTokenRequest {
    pub token: String,
}

#[derive(Serialize)]
pub struct AccountSummary {
    pub id: i64,
    pub email: String,
    pub products: Vec<String>,
}

#[derive(Serialize)]
pub struct VerifyTokenResponse {
    pub token: String,
    pub account: AccountSummary,
}

/// POST /auth/verify-token
///
/// Exchanges a magic-link (or still-valid session) token for a fresh
/// session token plus an account summary.
pub async fn verify_token<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
    Json(req): Json<VerifyTokenRequest>,
) -> Result<Json<VerifyTokenResponse>, AppError>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    if req.token.is_empty() {
        return Err(AppError::Validation("token is required".into()));
    }

    let claims = state
        .tokens
        .verify(&req.token)
        .map_err(|_| AppError::InvalidToken)?;
    let account_id = claims.account_id().map_err(|_| AppError::InvalidToken)?;

    let account = state
        .accounts
        .find_by_id(AccountId(account_id))?
        .ok_or(AppError::AccountNotFound)?;

    let session_token = state
        .tokens
        .issue_session_token(account.id.0)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let products = state.accounts.purchases(account.id)?;

    Ok(Json(VerifyTokenResponse {
        token: session_token,
        account: AccountSummary {
            id: account.id.0,
            email: account.email,
            products,
        },
    }))
}
