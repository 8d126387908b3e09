//! Payment provider abstractions
//!
//! The provider is an external collaborator reached through a narrow
//! interface: create a checkout session, and fetch a session's resolved
//! line items + payer email (the webhook body is never trusted for those).

pub mod stripe;

pub use stripe::StripeClient;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Payment provider errors
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider response missing {0}")]
    MissingField(&'static str),
}

/// A newly created checkout session
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// Provider-side truth for a finished checkout session
#[derive(Debug, Clone)]
pub struct CheckoutDetails {
    pub payer_email: Option<String>,
    pub product_id: Option<String>,
}

/// Narrow interface to the payment provider
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a checkout session for a price reference
    async fn create_checkout_session(
        &self,
        price_id: &str,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Fetch a session's line items and payer email from the provider
    async fn fetch_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutDetails, PaymentError>;
}

/// Recognized provider event types.
///
/// Dispatch over these is total: anything else is `Other` and gets
/// acknowledged without side effects so the provider stops redelivering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEventKind {
    /// Checkout finished and was paid
    Completed,
    /// Checkout abandoned; terminal no-op
    Expired,
    /// Delayed payment method settled
    AsyncPaymentSucceeded,
    /// Delayed payment method failed; terminal no-op
    AsyncPaymentFailed,
    /// Unrecognized type
    Other,
}

impl PaymentEventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "checkout.session.completed" => PaymentEventKind::Completed,
            "checkout.session.expired" => PaymentEventKind::Expired,
            "checkout.session.async_payment_succeeded" => PaymentEventKind::AsyncPaymentSucceeded,
            "checkout.session.async_payment_failed" => PaymentEventKind::AsyncPaymentFailed,
            _ => PaymentEventKind::Other,
        }
    }

    /// Whether this event entitles the payer to the purchased product
    pub fn is_entitling(&self) -> bool {
        matches!(
            self,
            PaymentEventKind::Completed | PaymentEventKind::AsyncPaymentSucceeded
        )
    }
}

/// The fields of a provider event the system acts on
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    /// Provider-assigned event id (idempotency key for the log)
    pub event_id: String,
    pub event_type: String,
    /// Checkout session id (the transaction id)
    pub session_id: Option<String>,
}

impl EventEnvelope {
    pub fn kind(&self) -> PaymentEventKind {
        PaymentEventKind::from_type(&self.event_type)
    }

    /// Parse the envelope out of a raw (already verified) event payload
    pub fn parse(payload: &[u8]) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct Wire {
            id: String,
            #[serde(rename = "type")]
            event_type: String,
            #[serde(default)]
            data: WireData,
        }

        #[derive(Deserialize, Default)]
        struct WireData {
            #[serde(default)]
            object: WireObject,
        }

        #[derive(Deserialize, Default)]
        struct WireObject {
            id: Option<String>,
        }

        let wire: Wire = serde_json::from_slice(payload)?;
        Ok(Self {
            event_id: wire.id,
            event_type: wire.event_type,
            session_id: wire.data.object.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_checkout_envelope() {
        let payload = br#"{
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": { "object": { "id": "cs_123", "payment_status": "paid" } }
        }"#;

        let envelope = EventEnvelope::parse(payload).unwrap();
        assert_eq!(envelope.event_id, "evt_1");
        assert_eq!(envelope.kind(), PaymentEventKind::Completed);
        assert_eq!(envelope.session_id.as_deref(), Some("cs_123"));
    }

    #[test]
    fn unknown_type_is_other() {
        let payload = br#"{"id":"evt_2","type":"invoice.paid","data":{"object":{}}}"#;

        let envelope = EventEnvelope::parse(payload).unwrap();
        assert_eq!(envelope.kind(), PaymentEventKind::Other);
        assert!(!envelope.kind().is_entitling());
    }

    #[test]
    fn missing_id_is_an_error() {
        assert!(EventEnvelope::parse(br#"{"type":"x"}"#).is_err());
    }
}
