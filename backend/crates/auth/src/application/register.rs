//! Register Use Case
//!
//! Creates an unverified Author account and mails a verification link.

use std::sync::Arc;

use crate::application::common::{check, hash_password, within};
use crate::application::config::IdentityConfig;
use crate::application::notification::{EmailData, Notification, NotificationKind, Notifier};
use crate::domain::entity::user::User;
use crate::domain::repository::UserDirectory;
use crate::domain::token::{TokenCodec, TokenPurpose};
use crate::domain::value_object::{
    email::Email, user_name::UserName, user_password::RawPassword,
};
use crate::error::{AuthError, AuthResult, FieldErrors};

/// Register input
pub struct RegisterInput {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

/// Register use case
pub struct RegisterUseCase<R>
where
    R: UserDirectory,
{
    users: Arc<R>,
    codec: Arc<TokenCodec>,
    notifier: Arc<dyn Notifier>,
    config: Arc<IdentityConfig>,
}

impl<R> RegisterUseCase<R>
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

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<User> {
        let mut errors = FieldErrors::new();
        let user_name = check(&mut errors, "username", UserName::new(&input.user_name));
        let email = check(&mut errors, "email", Email::new(&input.email));
        let (Some(user_name), Some(email)) = (user_name, email) else {
            return Err(AuthError::Validation(errors));
        };

        let timeout = self.config.directory_timeout;
        if within(timeout, self.users.find_by_email(&email)).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let raw_password = RawPassword::new(input.password)?;
        let password_hash = hash_password(
            raw_password,
            self.config.password_params,
            self.config.password_pepper.clone(),
        )
        .await?;

        // Role is never taken from the request
        let user = User::new(user_name, email, password_hash, self.codec.now());
        within(timeout, self.users.create(&user)).await?;

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

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name.as_str(),
            "User registered"
        );

        Ok(user)
    }
}
