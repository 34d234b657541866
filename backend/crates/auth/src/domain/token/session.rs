//! Session tokens (JWT, HS256 only)
//!
//! Time claims are checked against the injected clock, not by jsonwebtoken.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::TokenError;
use crate::domain::value_object::{user_id::UserId, user_role::UserRole};

/// JWT claims of a session token
///
/// `role` is a snapshot taken at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: UserId,
    pub role: UserRole,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Freshly issued session token
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub(super) struct SessionSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
}

impl SessionSigner {
    pub(super) fn new(secret: &[u8], issuer: String, audience: String) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&issuer]);
        validation.set_audience(&[&audience]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);
        validation.validate_exp = false;
        validation.validate_nbf = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            issuer,
            audience,
        }
    }

    pub(super) fn issue(
        &self,
        subject: &UserId,
        role: UserRole,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<SessionToken, jsonwebtoken::errors::Error> {
        let expires_at = now + ttl;
        let claims = SessionClaims {
            sub: *subject,
            role,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(SessionToken { token, expires_at })
    }

    pub(super) fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let claims = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| classify(e.kind()))?
            .claims;

        let now = now.timestamp();
        if now < claims.nbf || now > claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

fn classify(kind: &JwtErrorKind) -> TokenError {
    match kind {
        JwtErrorKind::InvalidSignature
        | JwtErrorKind::InvalidAlgorithm
        | JwtErrorKind::InvalidAlgorithmName
        | JwtErrorKind::InvalidKeyFormat => TokenError::BadSignature,
        JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}
