//! Two-Factor Use Case
//!
//! Stores or clears the TOTP secret of an account. The secret is only
//! handed back once, on enable.

use std::sync::Arc;

use kernel::clock::Clock;

use crate::application::common::{authorize_self_or_admin, within};
use crate::application::config::IdentityConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserDirectory;
use crate::domain::value_object::{totp_secret::TotpSecret, user_id::UserId};
use crate::error::{AuthError, AuthResult, FieldErrors};

/// Enrollment data for the authenticator app
#[derive(Debug)]
pub struct TwoFactorEnabled {
    pub secret: String,
    pub otpauth_url: String,
}

pub struct TwoFactorUseCase<R>
where
    R: UserDirectory,
{
    users: Arc<R>,
    clock: Arc<dyn Clock>,
    config: Arc<IdentityConfig>,
}

impl<R> TwoFactorUseCase<R>
where
    R: UserDirectory,
{
    pub fn new(users: Arc<R>, clock: Arc<dyn Clock>, config: Arc<IdentityConfig>) -> Self {
        Self {
            users,
            clock,
            config,
        }
    }

    /// Enable 2FA on `target`
    ///
    /// A missing `secret` is generated; a supplied one must be valid Base32.
    pub async fn enable(
        &self,
        actor: &UserId,
        target: &UserId,
        secret: Option<String>,
    ) -> AuthResult<TwoFactorEnabled> {
        let timeout = self.config.directory_timeout;
        authorize_self_or_admin(self.users.as_ref(), timeout, actor, target).await?;

        let mut user = self.load(target).await?;

        let secret = match secret.filter(|s| !s.trim().is_empty()) {
            Some(raw) => TotpSecret::from_base32(raw).map_err(|e| {
                AuthError::Validation(FieldErrors::from([("secret", e.message().to_string())]))
            })?,
            None => TotpSecret::generate(),
        };
        let otpauth_url = secret
            .otpauth_url(user.email.as_str())
            .map_err(|e| AuthError::Internal(format!("Failed to build otpauth URL: {e}")))?;

        let enabled = TwoFactorEnabled {
            secret: secret.as_base32().to_string(),
            otpauth_url,
        };
        user.enable_two_fa(secret, self.clock.now());
        within(timeout, self.users.update(&user)).await?;

        tracing::info!(user_id = %user.user_id, actor = %actor, "Two-factor enabled");
        Ok(enabled)
    }

    pub async fn disable(&self, actor: &UserId, target: &UserId) -> AuthResult<()> {
        let timeout = self.config.directory_timeout;
        authorize_self_or_admin(self.users.as_ref(), timeout, actor, target).await?;

        let mut user = self.load(target).await?;
        user.disable_two_fa(self.clock.now());
        within(timeout, self.users.update(&user)).await?;

        tracing::info!(user_id = %user.user_id, actor = %actor, "Two-factor disabled");
        Ok(())
    }

    async fn load(&self, user_id: &UserId) -> AuthResult<User> {
        within(self.config.directory_timeout, self.users.find_by_id(user_id))
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
