//! HTTP routes for the server

mod auth;
mod buckets;
mod export;
mod stripe;
mod templates;
mod wa_session;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::email::EmailSender;
use crate::payments::PaymentProvider;
use crate::state::AppState;
use crate::store::{AccountStore, EventLog, LeadStore};

/// Create the router with all routes
pub fn create_router<A, L, E, P>(state: Arc<AppState<A, L, E, P>>) -> Router
where
    A: AccountStore + EventLog + 'static,
    L: LeadStore + 'static,
    E: EmailSender + 'static,
    P: PaymentProvider + 'static,
{
    Router::new()
        .route("/auth/verify-token", post(auth::verify_token))
        .route("/auth/send-magic-link", post(auth::send_magic_link))
        .route(
            "/stripe/create-checkout-session",
            post(stripe::create_checkout_session),
        )
        .route("/stripe/webhook", post(stripe::webhook))
        .route(
            "/buckets",
            get(buckets::list_buckets).post(buckets::create_bucket),
        )
        .route("/buckets/{bucket_id}/contacts", get(buckets::bucket_contacts))
        .route("/export", post(export::export_contacts))
        .route(
            "/message-templates",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/message-templates/{template_id}",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
        .route("/whatsapp-auth/save", post(wa_session::save_session))
        .route("/whatsapp-auth/verify", post(wa_session::verify_session))
        .route(
            "/whatsapp-auth/session-exists",
            post(wa_session::session_exists),
        )
        .route(
            "/whatsapp-auth/{account_id}/{session_name}",
            delete(wa_session::delete_session),
        )
        // The frontend is served from another origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
