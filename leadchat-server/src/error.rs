//! Server error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Account not found")]
    AccountNotFound,

    #[error("Bucket not found")]
    BucketNotFound,

    #[error("Message template not found")]
    TemplateNotFound,

    #[error("Session credential not found")]
    CredentialNotFound,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid webhook signature")]
    InvalidWebhookSignature,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Dependency failure: {0}")]
    Dependency(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::AccountNotFound => {
                (StatusCode::NOT_FOUND, json!({ "error": "Account not found" }))
            }
            AppError::BucketNotFound => {
                (StatusCode::NOT_FOUND, json!({ "error": "Bucket not found" }))
            }
            AppError::TemplateNotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Message template not found" }),
            ),
            AppError::CredentialNotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Session credential not found" }),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Invalid or expired token" }),
            ),
            AppError::InvalidWebhookSignature => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid webhook signature" }),
            ),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            AppError::Dependency(msg) => {
                tracing::error!("Dependency failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Upstream dependency failed", "details": msg }),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
