//! Server configuration

/// Environment-driven configuration for the server binary
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Public base URL of the frontend, used to build magic-link and
    /// checkout redirect URLs
    pub client_url: String,

    /// Secret for signing login tokens
    pub token_secret: String,

    /// Payment provider API key
    pub stripe_secret_key: String,

    /// Shared secret for webhook signature verification
    pub stripe_webhook_secret: String,

    /// Timeout for outbound payment provider calls, in seconds
    pub stripe_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Secrets are required; everything else has a development default.
    pub fn from_env() -> Result<Self, String> {
        fn required(key: &str) -> Result<String, String> {
            std::env::var(key)
                .ok()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| format!("{key} is not set"))
        }

        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "leadchat.db".to_string());

        let client_url =
            std::env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let stripe_timeout_secs = std::env::var("STRIPE_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Ok(Self {
            port,
            database_path,
            client_url,
            token_secret: required("JWT_SECRET")?,
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
            stripe_timeout_secs,
        })
    }
}
