//! Verify Email Use Case
//!
//! Consumes verification tokens and re-sends verification links.

use std::sync::Arc;

use crate::application::common::within;
use crate::application::config::IdentityConfig;
use crate::application::notification::{EmailData, Notification, NotificationKind, Notifier};
use crate::domain::repository::UserDirectory;
use crate::domain::token::{TokenCodec, TokenPurpose};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

pub struct VerifyEmailUseCase<R>
where
    R: UserDirectory,
{
    users: Arc<R>,
    codec: Arc<TokenCodec>,
    notifier: Arc<dyn Notifier>,
    config: Arc<IdentityConfig>,
}

impl<R> VerifyEmailUseCase<R>
where
    R: UserDirectory,
{
    pub fn new(
        users: Arc<R>,
        codec: Arc<TokenCodec>,
        notifier: Arc<dyn Notifier>,
        config: Arc<IdentityConfig>,
    ) -> Self {
        Self {
            users,
            codec,
            notifier,
            config,
        }
    }

    /// Mark the token's subject as verified
    ///
    /// Verifying an already verified account succeeds without a write.
    pub async fn verify(&self, token: &str) -> AuthResult<()> {
        let claims = self
            .codec
            .expect_purpose(token, TokenPurpose::EmailVerification)?;

        let timeout = self.config.directory_timeout;
        let mut user = within(timeout, self.users.find_by_id(&claims.subject))
            .await?
            .ok_or(AuthError::InvalidOrExpiredToken)?;

        if user.email_verified {
            return Ok(());
        }

        user.mark_email_verified(self.codec.now());
        within(timeout, self.users.update(&user)).await?;

        tracing::info!(user_id = %user.user_id, "Email verified");
        Ok(())
    }

    /// Mail a fresh verification link
    pub async fn resend(&self, email: &str) -> AuthResult<()> {
        let email = Email::new(email).map_err(|_| AuthError::InvalidEmail)?;

        let user = within(
            self.config.directory_timeout,
            self.users.find_by_email(&email),
        )
        .await?
        .ok_or(AuthError::InvalidEmail)?;

        if user.email_verified {
            return Err(AuthError::AlreadyVerified);
        }

        let token = self.codec.issue_purpose_token(
            &user.user_id,
            TokenPurpose::EmailVerification,
            self.config.verification_ttl,
        );
        self.notifier.notify(Notification {
            to: user.email.as_str().to_string(),
            kind: NotificationKind::Verification,
            data: EmailData {
                username: user.user_name.as_str().to_string(),
                action_link: self.config.verification_link(&token),
                support_email: self.config.support_email.clone(),
            },
        });

        tracing::info!(user_id = %user.user_id, "Verification email re-sent");
        Ok(())
    }
}
