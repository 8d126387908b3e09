//! LeadChat backend
//!
//! Harvested-contact buckets, magic-link authentication, and a
//! payment-webhook-driven entitlement flow.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leadchat_core::TokenSigner;
use leadchat_server::{
    reconciler, routes, AppState, Config, ConsoleEmailSender, EmailSender, EventLog,
    SmtpConfig, SmtpEmailSender, SqliteStore, StripeClient,
};

/// How often the reconciler retries pending webhook events
const SWEEP_INTERVAL: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadchat_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow!(e))?;
    tracing::info!(port = config.port, database = %config.database_path, "Loaded configuration");

    // Open the store
    let store = Arc::new(SqliteStore::open(&config.database_path)?);

    // Events left inflight by a previous crash go back to pending
    let recovered = store.recover_inflight()?;
    if recovered > 0 {
        tracing::warn!(recovered, "Recovered inflight webhook events");
    }

    // Mail: SMTP when configured, console otherwise
    let email: Box<dyn EmailSender> = match SmtpConfig::from_env() {
        Some(smtp) => Box::new(SmtpEmailSender::new(smtp).map_err(|e| anyhow!(e))?),
        None => {
            tracing::warn!("SMTP not configured, magic links go to the console");
            Box::new(ConsoleEmailSender::new())
        }
    };

    let payments = StripeClient::new(
        &config.stripe_secret_key,
        &config.client_url,
        Duration::from_secs(config.stripe_timeout_secs),
    )?;

    let state = Arc::new(AppState::new(
        Arc::clone(&store),
        Arc::clone(&store),
        email,
        payments,
        TokenSigner::new(config.token_secret.as_bytes()),
        config.stripe_webhook_secret.clone(),
        config.client_url.clone(),
    ));

    // Background retry loop for webhook events
    reconciler::spawn_sweeper(Arc::clone(&state), SWEEP_INTERVAL);

    // Create router
    let app = routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
