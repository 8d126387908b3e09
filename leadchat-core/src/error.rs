//! Core error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Signature header is malformed")]
    MalformedSignatureHeader,

    #[error("Signature header has no timestamp")]
    MissingTimestamp,

    #[error("Signature header has no signature")]
    MissingSignature,

    #[error("Signature timestamp outside tolerance")]
    TimestampOutOfTolerance,

    #[error("Signature verification failed")]
    SignatureVerificationFailed,
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Error::TokenExpired,
            _ => Error::InvalidToken(err.to_string()),
        }
    }
}
