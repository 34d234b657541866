//! Profile Use Case
//!
//! Reads and mutates accounts on behalf of an authenticated actor.
//! Writes are read-modify-write; concurrent updates are last-write-wins.

use std::sync::Arc;

use kernel::clock::Clock;

use crate::application::common::{authorize_self_or_admin, check, load_actor, within};
use crate::application::config::IdentityConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserDirectory;
use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult, FieldErrors};

/// Profile update input. `None` leaves the field unchanged.
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub user_name: Option<String>,
    pub email: Option<String>,
}

pub struct ProfileUseCase<R>
where
    R: UserDirectory,
{
    users: Arc<R>,
    clock: Arc<dyn Clock>,
    config: Arc<IdentityConfig>,
}

impl<R> ProfileUseCase<R>
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

    pub async fn current(&self, actor: &UserId) -> AuthResult<User> {
        self.load(actor).await
    }

    /// Change username and/or email
    ///
    /// A new email keeps the current verification status.
    pub async fn update(
        &self,
        actor: &UserId,
        target: &UserId,
        input: UpdateProfileInput,
    ) -> AuthResult<User> {
        let mut errors = FieldErrors::new();
        let user_name = input
            .user_name
            .and_then(|raw| check(&mut errors, "username", UserName::new(raw)));
        let email = input
            .email
            .and_then(|raw| check(&mut errors, "email", Email::new(raw)));
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let timeout = self.config.directory_timeout;
        authorize_self_or_admin(self.users.as_ref(), timeout, actor, target).await?;

        let mut user = self.load(target).await?;
        if let Some(user_name) = user_name {
            user.set_user_name(user_name, self.clock.now());
        }
        if let Some(email) = email {
            user.set_email(email, self.clock.now());
        }
        within(timeout, self.users.update(&user)).await?;

        tracing::info!(user_id = %user.user_id, actor = %actor, "Profile updated");
        Ok(user)
    }

    /// Fails with `NotAuthorized` unless the actor currently holds Admin
    pub async fn require_admin(&self, actor: &UserId) -> AuthResult<()> {
        let timeout = self.config.directory_timeout;
        if !load_actor(self.users.as_ref(), timeout, actor).await?.user_role.is_admin() {
            return Err(AuthError::NotAuthorized);
        }
        Ok(())
    }

    /// Admin only
    pub async fn change_role(&self, actor: &UserId, target: &UserId, role: &str) -> AuthResult<()> {
        let timeout = self.config.directory_timeout;
        self.require_admin(actor).await?;

        let role = UserRole::from_code(&role.trim().to_ascii_lowercase()).ok_or_else(|| {
            AuthError::Validation(FieldErrors::from([(
                "role",
                "role must be one of admin, editor, author".to_string(),
            )]))
        })?;

        let mut user = self.load(target).await?;
        user.set_role(role, self.clock.now());
        within(timeout, self.users.update(&user)).await?;

        tracing::info!(user_id = %user.user_id, actor = %actor, role = %role, "Role changed");
        Ok(())
    }

    pub async fn delete(&self, actor: &UserId, target: &UserId) -> AuthResult<()> {
        let timeout = self.config.directory_timeout;
        authorize_self_or_admin(self.users.as_ref(), timeout, actor, target).await?;

        if !within(timeout, self.users.delete(target)).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(user_id = %target, actor = %actor, "User deleted");
        Ok(())
    }

    async fn load(&self, user_id: &UserId) -> AuthResult<User> {
        within(self.config.directory_timeout, self.users.find_by_id(user_id))
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
