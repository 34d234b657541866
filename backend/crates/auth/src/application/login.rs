//! Login Use Case
//!
//! Exchanges email + password for a session token.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::common::{verify_password, within};
use crate::application::config::IdentityConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserDirectory;
use crate::domain::token::TokenCodec;
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login output
#[derive(Debug)]
pub struct LoginOutput {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Login use case
pub struct LoginUseCase<R>
where
    R: UserDirectory,
{
    users: Arc<R>,
    codec: Arc<TokenCodec>,
    config: Arc<IdentityConfig>,
}

impl<R> LoginUseCase<R>
where
    R: UserDirectory,
{
    pub fn new(users: Arc<R>, codec: Arc<TokenCodec>, config: Arc<IdentityConfig>) -> Self {
        Self {
            users,
            codec,
            config,
        }
    }

    /// Unknown email and wrong password fail identically.
    /// The verification check only runs after the password matched.
    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        let email = Email::new(&input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = within(
            self.config.directory_timeout,
            self.users.find_by_email(&email),
        )
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

        let matched = verify_password(
            user.password_hash.clone(),
            RawPassword::candidate(input.password),
            self.config.password_pepper.clone(),
        )
        .await?;
        if !matched {
            tracing::debug!(user_id = %user.user_id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.can_sign_in() {
            return Err(AuthError::EmailNotVerified);
        }

        let session = self.codec.issue_session_token(&user.user_id, user.user_role)?;

        tracing::info!(
            user_id = %user.user_id,
            role = %user.user_role.code(),
            "User logged in"
        );

        Ok(LoginOutput {
            token: session.token,
            expires_at: session.expires_at,
            user,
        })
    }
}
