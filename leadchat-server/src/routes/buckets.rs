//! Bucket endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::email::EmailSender;
use crate::error::AppError;
use crate::payments::PaymentProvider;
use crate::state::AppState;
use crate::store::{AccountId, AccountStore, Bucket, Contact, EventLog, LeadStore};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketResponse {
    pub id: String,
    pub name: String,
    pub owner_id: i64,
    pub created_at: String,
    pub contact_count: u64,
}

impl BucketResponse {
    fn from_bucket(bucket: Bucket, contact_count: u64) -> Self {
        Self {
            id: bucket.id,
            name: bucket.name,
            owner_id: bucket.owner_id.0,
            created_at: bucket.created_at.to_rfc3339(),
            contact_count,
        }
    }
}

/// GET /buckets
pub async fn list_buckets<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
) -> Result<Json<Vec<BucketResponse>>, AppError>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    let buckets = state
        .leads
        .list_buckets()?
        .into_iter()
        .map(|summary| BucketResponse::from_bucket(summary.bucket, summary.contact_count))
        .collect();

    Ok(Json(buckets))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketRequest {
    pub name: String,
    pub account_id: i64,
}

/// POST /buckets
pub async fn create_bucket<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
    Json(req): Json<CreateBucketRequest>,
) -> Result<Json<BucketResponse>, AppError>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    if req.name.is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }

    let owner = state
        .accounts
        .find_by_id(AccountId(req.account_id))?
        .ok_or(AppError::AccountNotFound)?;

    let bucket = state.leads.create_bucket(&req.name, owner.id)?;

    Ok(Json(BucketResponse::from_bucket(bucket, 0)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: String,
    pub whatsapp_id: String,
    pub name: String,
    pub phone_number: String,
    pub group_id: String,
    pub group_name: String,
    pub bucket_id: String,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            whatsapp_id: contact.whatsapp_id,
            name: contact.name,
            phone_number: contact.phone_number,
            group_id: contact.group_id,
            group_name: contact.group_name,
            bucket_id: contact.bucket_id,
        }
    }
}

/// GET /buckets/{bucket_id}/contacts
pub async fn bucket_contacts<A, L, E, P>(
    State(state): State<Arc<AppState<A, L, E, P>>>,
    Path(bucket_id): Path<String>,
) -> Result<Json<Vec<ContactResponse>>, AppError>
where
    A: AccountStore + EventLog,
    L: LeadStore,
    E: EmailSender,
    P: PaymentProvider,
{
    if state.leads.find_bucket(&bucket_id)?.is_none() {
        return Err(AppError::BucketNotFound);
    }

    let contacts = state
        .leads
        .bucket_contacts(&bucket_id)?
        .into_iter()
        .map(ContactResponse::from)
        .collect();

    Ok(Json(contacts))
}
