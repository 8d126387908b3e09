//! Login token issuance and validation
//!
//! Tokens are HMAC-signed claims binding an account id. Two kinds exist:
//! short-lived magic-link tokens mailed to the user, and longer-lived
//! session tokens handed out after a successful verify. There is no
//! persisted token registry; verification is signature + expiry only.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Validity window for magic-link tokens (one hour)
pub const MAGIC_TOKEN_TTL_SECS: i64 = 3600;

/// Validity window for session tokens (seven days)
pub const SESSION_TOKEN_TTL_SECS: i64 = 7 * 24 * 3600;

/// What a token authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// One-shot login credential delivered by email
    Magic,
    /// Credential for an authenticated session
    Session,
}

/// Claims carried by a signed token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id the token is bound to
    pub sub: String,
    /// Issued-at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
    /// Token kind discriminator
    pub kind: TokenKind,
}

impl Claims {
    /// Parse the bound account id
    pub fn account_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|_| Error::InvalidToken("subject is not an account id".into()))
    }
}

/// Issues and validates signed login tokens
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    magic_ttl_secs: i64,
    session_ttl_secs: i64,
}

impl TokenSigner {
    /// Create a signer with the default validity windows
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttls(secret, MAGIC_TOKEN_TTL_SECS, SESSION_TOKEN_TTL_SECS)
    }

    /// Create a signer with explicit validity windows (tests use this)
    pub fn with_ttls(secret: &[u8], magic_ttl_secs: i64, session_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            magic_ttl_secs,
            session_ttl_secs,
        }
    }

    /// Issue a short-lived magic-link token for the given account
    pub fn issue_magic_token(&self, account_id: i64) -> Result<String> {
        self.issue(account_id, TokenKind::Magic, self.magic_ttl_secs)
    }

    /// Issue a session token for the given account
    pub fn issue_session_token(&self, account_id: i64) -> Result<String> {
        self.issue(account_id, TokenKind::Session, self.session_ttl_secs)
    }

    fn issue(&self, account_id: i64, kind: TokenKind, ttl_secs: i64) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: account_id.to_string(),
            iat: now,
            exp: now + ttl_secs,
            kind,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and return its claims
    ///
    /// Expiry is enforced with zero leeway.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_signer() -> TokenSigner {
        TokenSigner::new(b"test-secret-key-for-testing")
    }

    #[test]
    fn magic_token_round_trips_account_id() {
        let signer = test_signer();
        let token = signer.issue_magic_token(42).unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.account_id().unwrap(), 42);
        assert_eq!(claims.kind, TokenKind::Magic);
        assert_eq!(claims.exp - claims.iat, MAGIC_TOKEN_TTL_SECS);
    }

    #[test]
    fn session_token_has_longer_window() {
        let signer = test_signer();
        let token = signer.issue_session_token(7).unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.kind, TokenKind::Session);
        assert_eq!(claims.exp - claims.iat, SESSION_TOKEN_TTL_SECS);
    }

    #[test]
    fn expired_token_fails_verification() {
        let signer = TokenSigner::with_ttls(b"test-secret", -60, -60);
        let token = signer.issue_magic_token(1).unwrap();

        assert!(matches!(signer.verify(&token), Err(Error::TokenExpired)));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let signer = test_signer();
        let other = TokenSigner::new(b"a-different-secret");

        let token = signer.issue_magic_token(1).unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn garbage_fails_verification() {
        let signer = test_signer();
        assert!(signer.verify("not-a-token").is_err());
    }
}
