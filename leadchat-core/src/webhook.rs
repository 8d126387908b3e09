//! Payment-webhook signature verification
//!
//! The provider signs the exact raw request bytes with a shared secret and
//! ships the result in a header of the form `t=<unix-ts>,v1=<hex-hmac>`.
//! The signed payload is `"{timestamp}.{raw_body}"`, HMAC-SHA256. A header
//! may carry several `v1` entries (secret rotation); any valid one passes.
//! Verification must run against the raw bytes, never a re-serialized body.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Default timestamp tolerance (five minutes), guarding against replay
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Verify a provider signature header against the raw payload bytes.
///
/// `now` is the current Unix timestamp; timestamps older or newer than
/// `tolerance_secs` are rejected before any HMAC work.
pub fn verify_signature_at(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<()> {
    let (timestamp, signatures) = parse_header(signature_header)?;

    if (now - timestamp).abs() > tolerance_secs {
        return Err(Error::TimestampOutOfTolerance);
    }

    let mut signed_payload = timestamp.to_string().into_bytes();
    signed_payload.push(b'.');
    signed_payload.extend_from_slice(payload);

    for signature in &signatures {
        let Ok(tag) = hex::decode(signature) else {
            continue;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(&signed_payload);
        if mac.verify_slice(&tag).is_ok() {
            return Ok(());
        }
    }

    Err(Error::SignatureVerificationFailed)
}

/// Verify against the current wall clock with the default tolerance
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &str) -> Result<()> {
    verify_signature_at(
        payload,
        signature_header,
        secret,
        DEFAULT_TOLERANCE_SECS,
        chrono::Utc::now().timestamp(),
    )
}

/// Split the header into its timestamp and `v1` signatures
fn parse_header(header: &str) -> Result<(i64, Vec<&str>)> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            return Err(Error::MalformedSignatureHeader);
        };
        match key {
            "t" => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| Error::MalformedSignatureHeader)?,
                );
            }
            "v1" => signatures.push(value),
            // Unknown schemes (v0, ...) are ignored, as the provider documents
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(Error::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(Error::MissingSignature);
    }

    Ok((timestamp, signatures))
}
