//! Slack request signature verification.
//!
//! Slack signs every request with the app's signing secret:
//!
//! ```text
//! basestring = "v0:" + X-Slack-Request-Timestamp + ":" + raw_body
//! signature  = "v0=" + hex(HMAC-SHA256(signing_secret, basestring))
//! ```
//!
//! Requests older than [`MAX_REQUEST_AGE_SECS`] are rejected to limit
//! replay. The final comparison is constant-time (`Mac::verify_slice`).

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Five minutes.
pub const MAX_REQUEST_AGE_SECS: i64 = 60 * 5;

const VERSION_PREFIX: &str = "v0=";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Missing Slack signature headers.")]
    MissingHeaders,
    #[error("Stale Slack request.")]
    Stale,
    #[error("Invalid Slack signature.")]
    Invalid,
}

/// Compute the `v0=<hex>` signature for a request.
pub fn compute_signature(secret: &str, timestamp: &str, body: &[u8]) -> String {
    let mac = signing_mac(secret, timestamp, body);
    format!("{}{}", VERSION_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

fn signing_mac(secret: &str, timestamp: &str, body: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    mac
}

/// Verify a request against the signing secret at time `now` (unix seconds).
pub fn verify_signature(
    secret: &str,
    signature: Option<&str>,
    timestamp: Option<&str>,
    body: &[u8],
    now: i64,
) -> Result<(), SignatureError> {
    let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
        return Err(SignatureError::MissingHeaders);
    };

    let ts: i64 = timestamp.trim().parse().map_err(|_| SignatureError::Stale)?;
    if (now - ts).abs() > MAX_REQUEST_AGE_SECS {
        return Err(SignatureError::Stale);
    }

    let provided = signature
        .strip_prefix(VERSION_PREFIX)
        .and_then(|h| hex::decode(h).ok())
        .ok_or(SignatureError::Invalid)?;

    signing_mac(secret, timestamp, body)
        .verify_slice(&provided)
        .map_err(|_| SignatureError::Invalid)
}
