//! Message template CRUD endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::email::EmailSender;
use crate::error::AppError;
use crate::payments::PaymentProvider;
use crate::state::AppState;
use crate::store::{AccountStore, EventLog, LeadStore, MessageTemplate};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    pub id: String,
    pub title: String,
    pub message: String,
    pub created_at: String,
}

impl From<MessageTemplate> for TemplateResponse {
    fn from(template: MessageTemplate) -> Self {
        Self {
            id: template.id,
            title: template.title,
            message: template.message,
            created_at: template.created_at.to_rfc3339(),
        }
    }
}

#[derive(Deserialize)]
pub struct TemplateRequest {
    pub title: String,
    pub message: String,
}

fn validate(req: &TemplateRequest) -> Result<(), AppError> {
    if req.title.is_empty() {
        return Err(AppError::Validation("title is required".into()));
    }
    if req.message.is_empty() {
        return Err(AppError::Validation("message is required".into()));
    }
    Ok(())
}

/// GET /message-templates
pub async fn list_templates<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
) -> Result<Json<Vec<TemplateResponse>>, AppError>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    let templates = state
        .leads
        .list_templates()?
        .into_iter()
        .map(TemplateResponse::from)
        .collect();

    Ok(Json(templates))
}

/// POST /message-templates
pub async fn create_template<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
    Json(req): Json<TemplateRequest>,
) -> Result<Json<TemplateResponse>, AppError>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    validate(&req)?;

    let template = state.leads.create_template(&req.title, &req.message)?;
    Ok(Json(template.into()))
}

/// GET /message-templates/{template_id}
pub async fn get_template<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
    Path(template_id): Path<String>,
) -> Result<Json<TemplateResponse>, AppError>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    let template = state
        .leads
        .find_template(&template_id)?
        .ok_or(AppError::TemplateNotFound)?;

    Ok(Json(template.into()))
}

/// PUT /message-templates/{template_id}
pub async fn update_template<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
    Path(template_id): Path<String>,
    Json(req): Json<TemplateRequest>,
) -> Result<Json<TemplateResponse>, AppError>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    validate(&req)?;

    let template = state
        .leads
        .update_template(&template_id, &req.title, &req.message)?;
    Ok(Json(template.into()))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// DELETE /message-templates/{template_id}
pub async fn delete_template<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
    Path(template_id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    state.leads.delete_template(&template_id)?;

    Ok(Json(DeleteResponse {
        message: "Template deleted successfully".to_string(),
    }))
}
