//! Helpers shared by the use cases

use std::future::Future;
use std::time::Duration;

use kernel::error::app_error::AppResult;
use platform::password::PasswordHashParams;

use crate::domain::entity::user::User;
use crate::domain::repository::UserDirectory;
use crate::domain::value_object::user_id::UserId;
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AuthError, AuthResult, FieldErrors};

/// Bound a directory call by `limit`
pub async fn within<T, F>(limit: Duration, call: F) -> AuthResult<T>
where
    F: Future<Output = AuthResult<T>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| AuthError::DeadlineExceeded)?
}

/// Argon2id off the async workers
pub async fn hash_password(
    raw: RawPassword,
    params: PasswordHashParams,
    pepper: Option<Vec<u8>>,
) -> AuthResult<UserPassword> {
    tokio::task::spawn_blocking(move || UserPassword::from_raw(&raw, &params, pepper.as_deref()))
        .await?
}

pub async fn verify_password(
    digest: UserPassword,
    candidate: RawPassword,
    pepper: Option<Vec<u8>>,
) -> AuthResult<bool> {
    let matched =
        tokio::task::spawn_blocking(move || digest.verify(&candidate, pepper.as_deref())).await?;
    Ok(matched)
}

/// Record a failed value-object check under `name`
pub fn check<T>(errors: &mut FieldErrors, name: &'static str, result: AppResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.insert(name, e.message().to_string());
            None
        }
    }
}

/// Load the acting user; an account that no longer exists may not act
pub async fn load_actor<R>(users: &R, limit: Duration, actor: &UserId) -> AuthResult<User>
where
    R: UserDirectory,
{
    within(limit, users.find_by_id(actor))
        .await?
        .ok_or(AuthError::NotAuthorized)
}

/// Self-service or Admin, with the role read from the directory
pub async fn authorize_self_or_admin<R>(
    users: &R,
    limit: Duration,
    actor: &UserId,
    target: &UserId,
) -> AuthResult<()>
where
    R: UserDirectory,
{
    if actor == target {
        return Ok(());
    }
    if load_actor(users, limit, actor).await?.user_role.is_admin() {
        Ok(())
    } else {
        Err(AuthError::NotAuthorized)
    }
}
