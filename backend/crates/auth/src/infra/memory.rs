//! In-memory User Directory
//!
//! Same uniqueness rules as the Postgres implementation. Used by tests and
//! local runs without a database.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::entity::user::User;
use crate::domain::repository::UserDirectory;
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

/// Reject a record whose email or username belongs to another user
fn check_unique(users: &HashMap<UserId, User>, candidate: &User) -> AuthResult<()> {
    for other in users.values().filter(|u| u.user_id != candidate.user_id) {
        if other.email == candidate.email {
            return Err(AuthError::EmailTaken);
        }
        if other.user_name == candidate.user_name {
            return Err(AuthError::UsernameTaken);
        }
    }
    Ok(())
}

impl UserDirectory for InMemoryUserDirectory {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.user_id) {
            return Err(AuthError::Internal(format!("Duplicate user id {}", user.user_id)));
        }
        check_unique(&users, user)?;
        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| &u.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.user_id) {
            return Err(AuthError::UserNotFound);
        }
        check_unique(&users, user)?;
        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
        Ok(self.users.write().await.remove(user_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        user_name::UserName,
        user_password::{RawPassword, UserPassword},
    };
    use platform::password::PasswordHashParams;

    fn user(name: &str, email: &str) -> User {
        let raw = RawPassword::new("Secret123".to_string()).unwrap();
        User::new(
            UserName::new(name).unwrap(),
            Email::new(email).unwrap(),
            UserPassword::from_raw(&raw, &PasswordHashParams::minimal(), None).unwrap(),
            chrono::Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let dir = InMemoryUserDirectory::new();
        let alice = user("alice", "alice@x.io");
        dir.create(&alice).await.unwrap();

        let by_email = dir.find_by_email(&Email::new("ALICE@x.io").unwrap()).await.unwrap();
        assert_eq!(by_email.unwrap().user_id, alice.user_id);
        assert!(dir.find_by_id(&alice.user_id).await.unwrap().is_some());
        assert!(dir.find_by_id(&UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_email_and_username() {
        let dir = InMemoryUserDirectory::new();
        dir.create(&user("alice", "alice@x.io")).await.unwrap();

        let err = dir.create(&user("alice2", "alice@x.io")).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));

        let err = dir.create(&user("alice", "other@x.io")).await.unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));

        assert_eq!(dir.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_conflict_and_missing() {
        let dir = InMemoryUserDirectory::new();
        let alice = user("alice", "alice@x.io");
        let mut bob = user("bob", "bob@x.io");
        dir.create(&alice).await.unwrap();
        dir.create(&bob).await.unwrap();

        bob.set_email(Email::new("alice@x.io").unwrap(), chrono::Utc::now());
        assert!(matches!(dir.update(&bob).await, Err(AuthError::EmailTaken)));

        let ghost = user("ghost", "ghost@x.io");
        assert!(matches!(dir.update(&ghost).await, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = InMemoryUserDirectory::new();
        let alice = user("alice", "alice@x.io");
        dir.create(&alice).await.unwrap();

        assert!(dir.delete(&alice.user_id).await.unwrap());
        assert!(!dir.delete(&alice.user_id).await.unwrap());
        assert!(dir.is_empty().await);
    }
}
