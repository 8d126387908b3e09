//! Stripe REST API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;

use super::{CheckoutDetails, CheckoutSession, PaymentError, PaymentProvider};

const API_BASE: &str = "https://api.stripe.com";

/// Stripe API client.
///
/// Every call is bounded by the configured timeout; a timed-out line-item
/// lookup surfaces as an error so the caller retries instead of recording
/// a purchase it never confirmed.
pub struct StripeClient {
    http: reqwest::Client,
    base_url: String,
    /// Frontend base URL for checkout redirect targets
    client_url: String,
}

impl StripeClient {
    /// Create a client authenticated with the given secret key
    pub fn new(secret_key: &str, client_url: &str, timeout: Duration) -> Result<Self, PaymentError> {
        if secret_key.is_empty() {
            return Err(PaymentError::Config("secret key is empty".into()));
        }

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", secret_key))
            .map_err(|_| PaymentError::Config("invalid secret key format".into()))?;
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: API_BASE.to_string(),
            client_url: client_url.trim_end_matches('/').to_string(),
        })
    }

    async fn check<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, PaymentError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

#[derive(Deserialize)]
struct SessionWire {
    id: String,
    url: Option<String>,
    customer_details: Option<CustomerDetailsWire>,
}

#[derive(Deserialize)]
struct CustomerDetailsWire {
    email: Option<String>,
}

#[derive(Deserialize)]
struct LineItemsWire {
    data: Vec<LineItemWire>,
}

#[derive(Deserialize)]
struct LineItemWire {
    price: Option<PriceWire>,
}

#[derive(Deserialize)]
struct PriceWire {
    product: Option<String>,
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        price_id: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let success_url = format!(
            "{}/success?session_id={{CHECKOUT_SESSION_ID}}",
            self.client_url
        );
        let cancel_url = format!("{}/pricing", self.client_url);
        let params = [
            ("mode", "payment"),
            ("payment_method_types[0]", "card"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", success_url.as_str()),
            ("cancel_url", cancel_url.as_str()),
        ];

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .form(&params)
            .send()
            .await?;

        let session: SessionWire = Self::check(response).await?;
        tracing::info!(session_id = %session.id, price_id = %price_id, "Created checkout session");

        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }

    async fn fetch_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutDetails, PaymentError> {
        // The webhook payload may omit line-item detail, so the session and
        // its line items are both read back from the provider.
        let response = self
            .http
            .get(format!(
                "{}/v1/checkout/sessions/{}",
                self.base_url, session_id
            ))
            .send()
            .await?;
        let session: SessionWire = Self::check(response).await?;

        let response = self
            .http
            .get(format!(
                "{}/v1/checkout/sessions/{}/line_items",
                self.base_url, session_id
            ))
            .send()
            .await?;
        let line_items: LineItemsWire = Self::check(response).await?;

        Ok(CheckoutDetails {
            payer_email: session.customer_details.and_then(|d| d.email),
            product_id: line_items
                .data
                .into_iter()
                .next()
                .and_then(|item| item.price)
                .and_then(|price| price.product),
        })
    }
}
