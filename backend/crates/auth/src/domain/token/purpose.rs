//! Purpose tokens
//!
//! Short-lived, single-purpose tokens mailed to users (email verification,
//! password reset). Wire format:
//!
//! ```text
//! base64url(json{sub,pur,iat,exp}) "." base64url(HMAC-SHA256(first part))
//! ```
//!
//! Parsing order: signature, then payload shape, then expiry, then subject.

use chrono::{DateTime, Duration, Utc};
use platform::crypto::{SigningKey, from_base64url, to_base64url};
use serde::{Deserialize, Serialize};

use super::TokenError;
use crate::domain::value_object::user_id::UserId;

/// What a purpose token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    EmailVerification,
    PasswordReset,
}

/// Verified contents of a purpose token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurposeClaims {
    pub subject: UserId,
    pub purpose: TokenPurpose,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct WireClaims<'a> {
    sub: &'a str,
    pur: TokenPurpose,
    iat: i64,
    exp: i64,
}

/// Subject is optional here so a missing one is reported after expiry.
#[derive(Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: Option<String>,
    pur: TokenPurpose,
    iat: i64,
    exp: i64,
}

pub(super) struct PurposeSigner {
    key: SigningKey,
}

impl PurposeSigner {
    pub(super) fn new(key: SigningKey) -> Self {
        Self { key }
    }

    pub(super) fn issue(
        &self,
        subject: &UserId,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> String {
        let subject = subject.to_string();
        let claims = WireClaims {
            sub: &subject,
            pur: purpose,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        // Serializing a struct of strings and integers cannot fail.
        let json = serde_json::to_vec(&claims).unwrap_or_default();
        self.seal(&to_base64url(&json))
    }

    fn seal(&self, payload_b64: &str) -> String {
        let signature = self.key.sign(payload_b64.as_bytes());
        format!("{}.{}", payload_b64, to_base64url(&signature))
    }

    pub(super) fn parse(&self, token: &str, now: DateTime<Utc>) -> Result<PurposeClaims, TokenError> {
        let (payload_b64, signature_b64) =
            token.rsplit_once('.').ok_or(TokenError::BadSignature)?;

        let signature = from_base64url(signature_b64).map_err(|_| TokenError::BadSignature)?;
        if !self.key.verify(payload_b64.as_bytes(), &signature) {
            return Err(TokenError::BadSignature);
        }

        let payload = from_base64url(payload_b64).map_err(|_| TokenError::Malformed)?;
        let raw: RawClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if now.timestamp() > raw.exp {
            return Err(TokenError::Expired);
        }

        let subject = raw
            .sub
            .as_deref()
            .ok_or(TokenError::Malformed)?
            .parse::<UserId>()
            .map_err(|_| TokenError::Malformed)?;

        let issued_at = DateTime::from_timestamp(raw.iat, 0).ok_or(TokenError::Malformed)?;
        let expires_at = DateTime::from_timestamp(raw.exp, 0).ok_or(TokenError::Malformed)?;

        Ok(PurposeClaims {
            subject,
            purpose: raw.pur,
            issued_at,
            expires_at,
        })
    }

    /// Sign an arbitrary payload, for exercising the parse order in tests
    #[cfg(test)]
    pub(super) fn seal_json(&self, json: &str) -> String {
        self.seal(&to_base64url(json.as_bytes()))
    }
}
