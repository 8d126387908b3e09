//! LeadChat backend
//!
//! Harvested-contact buckets, magic-link authentication, and a
//! payment-webhook-driven entitlement flow over a shared persistent store.

pub mod config;
pub mod email;
pub mod error;
pub mod payments;
pub mod reconciler;
pub mod routes;
pub mod state;
pub mod store;

pub use config::Config;
pub use email::{ConsoleEmailSender, EmailSender, SmtpConfig, SmtpEmailSender};
pub use error::AppError;
pub use payments::{PaymentProvider, StripeClient};
pub use state::AppState;
pub use store::{
    AccountStore, EventLog, InMemoryAccountStore, InMemoryLeadStore, LeadStore, SqliteStore,
};
