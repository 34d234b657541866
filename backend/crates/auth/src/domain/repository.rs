//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::user::User;
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::AuthResult;

/// User directory
///
/// Uniqueness of email and username is enforced here: a violating `create`
/// or `update` fails with `AuthError::EmailTaken` / `AuthError::UsernameTaken`.
#[trait_variant::make(UserDirectory: Send)]
pub trait LocalUserDirectory {
    /// Persist a new user
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by (lower-cased) email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Overwrite the stored record (last write wins)
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Hard delete. Returns `false` when no such user existed.
    async fn delete(&self, user_id: &UserId) -> AuthResult<bool>;
}
