//! Network-free decode of the final token's claims. Only the expiry matters
//! locally, and only transiently: claims are decoded fresh on each check so
//! a rotated or cleared token is never judged from a stale decode. The
//! signature is not verified here; that is the backend's job.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
}

/// Claims carried by the final token. The expiry is optional; a token
/// without one never expires locally.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl TokenClaims {
    /// True when an expiry claim exists and `now` is at or past it.
    #[must_use]
    pub fn expired_at(&self, now_unix_seconds: i64) -> bool {
        self.exp.is_some_and(|exp| now_unix_seconds >= exp)
    }
}

/// Decodes the claims segment of a JWT-shaped token without verifying the
/// signature.
///
/// # Errors
/// Returns an error if the token does not have exactly three segments or
/// the claims segment is not base64url-encoded JSON.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut parts = token.split('.');
    let _header = parts.next().ok_or(TokenError::TokenFormat)?;
    let claims_b64 = parts.next().ok_or(TokenError::TokenFormat)?;
    let _signature = parts.next().ok_or(TokenError::TokenFormat)?;
    if parts.next().is_some() {
        return Err(TokenError::TokenFormat);
    }

    let bytes = Base64UrlUnpadded::decode_vec(claims_b64).map_err(|_| TokenError::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}
