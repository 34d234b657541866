//! Token Codec
//!
//! Two signing domains derived from one server secret:
//! - purpose tokens (email verification, password reset), see [`purpose`]
//! - session tokens (JWT), see [`session`]
//!
//! All expiry checks read the injected [`Clock`].

pub mod purpose;
pub mod session;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use kernel::clock::Clock;
use platform::crypto::{SecretTooShort, SigningKey};
use thiserror::Error;

pub use purpose::{PurposeClaims, TokenPurpose};
pub use session::{SessionClaims, SessionToken};

use crate::domain::value_object::{user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Label mixed into the secret to key the purpose-token domain
const PURPOSE_KEY_LABEL: &[u8] = b"minddrift/purpose-token/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token is malformed")]
    Malformed,

    #[error("Token signature is invalid")]
    BadSignature,

    #[error("Token has expired")]
    Expired,
}

/// Issues and verifies every token the service hands out
pub struct TokenCodec {
    purpose: purpose::PurposeSigner,
    session: session::SessionSigner,
    session_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        audience: impl Into<String>,
        session_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SecretTooShort> {
        let root = SigningKey::new(secret)?;
        let purpose_key = SigningKey::new(&root.sign(PURPOSE_KEY_LABEL))?;

        Ok(Self {
            purpose: purpose::PurposeSigner::new(purpose_key),
            session: session::SessionSigner::new(secret, issuer.into(), audience.into()),
            session_ttl,
            clock,
        })
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// Current time on the codec's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ========================================================================
    // Purpose tokens
    // ========================================================================

    pub fn issue_purpose_token(&self, subject: &UserId, purpose: TokenPurpose, ttl: Duration) -> String {
        self.purpose.issue(subject, purpose, self.clock.now(), ttl)
    }

    /// Verify signature, expiry and subject of a purpose token
    ///
    /// The purpose is returned, not checked; see [`Self::expect_purpose`].
    pub fn parse_purpose_token(&self, token: &str) -> Result<PurposeClaims, TokenError> {
        self.purpose.parse(token, self.clock.now())
    }

    /// Parse and require a specific purpose
    pub fn expect_purpose(&self, token: &str, purpose: TokenPurpose) -> Result<PurposeClaims, TokenError> {
        let claims = self.parse_purpose_token(token)?;
        if claims.purpose != purpose {
            return Err(TokenError::Malformed);
        }
        Ok(claims)
    }

    // ========================================================================
    // Session tokens
    // ========================================================================

    pub fn issue_session_token(&self, subject: &UserId, role: UserRole) -> AuthResult<SessionToken> {
        self.session
            .issue(subject, role, self.clock.now(), self.session_ttl)
            .map_err(|e| AuthError::Internal(format!("Failed to sign session token: {e}")))
    }

    pub fn verify_session_token(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.session.verify(token, self.clock.now())
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}
