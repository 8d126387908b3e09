//! LeadChat credential primitives
//!
//! Pure logic shared by the server: HMAC-signed login tokens
//! (magic-link and session) and payment-webhook signature verification.
//! No I/O lives here.

pub mod error;
pub mod token;
pub mod webhook;

pub use error::Error;
pub use token::{Claims, TokenKind, TokenSigner};
pub use webhook::verify_signature;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;
