//! Application Configuration
//!
//! Configuration for the identity application layer.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use kernel::clock::Clock;
use platform::crypto::{SecretTooShort, random_bytes};
use platform::password::PasswordHashParams;

use crate::domain::token::TokenCodec;

/// Identity configuration
///
/// Read-only after startup. The token secret is never logged.
#[derive(Clone)]
pub struct IdentityConfig {
    /// HMAC secret for purpose and session tokens (at least 32 bytes)
    pub token_secret: Vec<u8>,
    /// JWT `iss`
    pub issuer: String,
    /// JWT `aud`
    pub audience: String,
    /// Session token lifetime (24 hours)
    pub session_ttl: Duration,
    /// Email verification token lifetime (24 hours)
    pub verification_ttl: Duration,
    /// Password reset token lifetime (30 minutes)
    pub reset_ttl: Duration,
    /// Base of action links in outgoing mail
    pub frontend_url: String,
    /// Contact address shown in outgoing mail
    pub support_email: String,
    pub password_params: PasswordHashParams,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Upper bound for a single user directory call
    pub directory_timeout: StdDuration,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            token_secret: Vec::new(),
            issuer: "minddrift".to_string(),
            audience: "minddrift".to_string(),
            session_ttl: Duration::hours(24),
            verification_ttl: Duration::hours(24),
            reset_ttl: Duration::minutes(30),
            frontend_url: "http://localhost:3000".to_string(),
            support_email: "support@minddrift.local".to_string(),
            password_params: PasswordHashParams::default(),
            password_pepper: None,
            directory_timeout: StdDuration::from_secs(5),
        }
    }
}

impl IdentityConfig {
    /// Create config with a random token secret (for development)
    pub fn development() -> Self {
        Self {
            token_secret: random_bytes(32),
            ..Default::default()
        }
    }

    /// Build the codec for this configuration
    pub fn token_codec(&self, clock: Arc<dyn Clock>) -> Result<TokenCodec, SecretTooShort> {
        TokenCodec::new(
            &self.token_secret,
            self.issuer.clone(),
            self.audience.clone(),
            self.session_ttl,
            clock,
        )
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/verify-email?token={}", self.frontend_url.trim_end_matches('/'), token)
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.frontend_url.trim_end_matches('/'), token)
    }
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("token_secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("session_ttl", &self.session_ttl)
            .field("verification_ttl", &self.verification_ttl)
            .field("reset_ttl", &self.reset_ttl)
            .field("frontend_url", &self.frontend_url)
            .field("support_email", &self.support_email)
            .field("password_params", &self.password_params)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .field("directory_timeout", &self.directory_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::clock::SystemClock;

    #[test]
    fn test_links_use_frontend_url() {
        let config = IdentityConfig {
            frontend_url: "https://minddrift.dev/".to_string(),
            ..IdentityConfig::development()
        };
        assert_eq!(
            config.verification_link("abc"),
            "https://minddrift.dev/verify-email?token=abc"
        );
        assert_eq!(
            config.reset_link("abc"),
            "https://minddrift.dev/reset-password?token=abc"
        );
    }

    #[test]
    fn test_development_config_builds_codec() {
        let config = IdentityConfig::development();
        assert!(config.token_codec(Arc::new(SystemClock)).is_ok());
        assert!(IdentityConfig::default().token_codec(Arc::new(SystemClock)).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = IdentityConfig {
            token_secret: b"super-secret-value-that-must-not-leak".to_vec(),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
