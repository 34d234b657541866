//! Password Reset Use Case
//!
//! `request` answers the same way whether or not the email is registered.

use std::sync::Arc;

use crate::application::common::{hash_password, within};
use crate::application::config::IdentityConfig;
use crate::application::notification::{EmailData, Notification, NotificationKind, Notifier};
use crate::domain::entity::user::User;
use crate::domain::repository::UserDirectory;
use crate::domain::token::{TokenCodec, TokenPurpose};
use crate::domain::value_object::{email::Email, user_id::UserId, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

pub struct PasswordResetUseCase<R>
where
    R: UserDirectory,
{
    users: Arc<R>,
    codec: Arc<TokenCodec>,
    notifier: Arc<dyn Notifier>,
    config: Arc<IdentityConfig>,
}

impl<R> PasswordResetUseCase<R>
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

    /// Mail a reset link if the account exists
    pub async fn request(&self, email: &str) -> AuthResult<()> {
        let Ok(email) = Email::new(email) else {
            return Ok(());
        };

        let Some(user) = within(
            self.config.directory_timeout,
            self.users.find_by_email(&email),
        )
        .await?
        else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = self.codec.issue_purpose_token(
            &user.user_id,
            TokenPurpose::PasswordReset,
            self.config.reset_ttl,
        );
        self.notifier.notify(Notification {
            to: user.email.as_str().to_string(),
            kind: NotificationKind::PasswordReset,
            data: EmailData {
                username: user.user_name.as_str().to_string(),
                action_link: self.config.reset_link(&token),
                support_email: self.config.support_email.clone(),
            },
        });

        tracing::info!(user_id = %user.user_id, "Password reset requested");
        Ok(())
    }

    /// Check a reset token before showing the new-password form
    pub async fn validate(&self, token: &str) -> AuthResult<()> {
        let claims = self
            .codec
            .expect_purpose(token, TokenPurpose::PasswordReset)
            .map_err(|_| AuthError::InvalidToken)?;

        self.find_subject(&claims.subject).await.map(|_| ())
    }

    pub async fn reset(&self, token: &str, new_password: String) -> AuthResult<()> {
        let claims = self
            .codec
            .expect_purpose(token, TokenPurpose::PasswordReset)?;

        let mut user = self.find_subject(&claims.subject).await?;

        let raw_password = RawPassword::new(new_password)?;
        let password_hash = hash_password(
            raw_password,
            self.config.password_params,
            self.config.password_pepper.clone(),
        )
        .await?;

        user.set_password(password_hash, self.codec.now());
        within(self.config.directory_timeout, self.users.update(&user)).await?;

        tracing::info!(user_id = %user.user_id, "Password reset");
        Ok(())
    }

    async fn find_subject(&self, subject: &UserId) -> AuthResult<User> {
        within(self.config.directory_timeout, self.users.find_by_id(subject))
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}
