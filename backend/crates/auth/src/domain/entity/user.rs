//! User Entity
//!
//! The single account record: identity, credentials and flags.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email, totp_secret::TotpSecret, user_id::UserId, user_name::UserName,
    user_password::UserPassword, user_role::UserRole,
};

/// User entity
///
/// `password_hash` never leaves the crate in any response type.
/// `two_fa_secret` is present only while `two_fa_enabled` is true.
/// Timestamps come from the caller so they follow the same clock as tokens.
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier (immutable)
    pub user_id: UserId,
    pub user_name: UserName,
    pub email: Email,
    pub password_hash: UserPassword,
    pub user_role: UserRole,
    pub email_verified: bool,
    pub two_fa_enabled: bool,
    pub two_fa_secret: Option<TotpSecret>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New, unverified author account
    pub fn new(
        user_name: UserName,
        email: Email,
        password_hash: UserPassword,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: UserId::new(),
            user_name,
            email,
            password_hash,
            user_role: UserRole::default(),
            email_verified: false,
            two_fa_enabled: false,
            two_fa_secret: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sessions may only be issued to verified accounts
    pub fn can_sign_in(&self) -> bool {
        self.email_verified
    }

    /// Idempotent
    pub fn mark_email_verified(&mut self, now: DateTime<Utc>) {
        if !self.email_verified {
            self.email_verified = true;
            self.touch(now);
        }
    }

    pub fn set_password(&mut self, password_hash: UserPassword, now: DateTime<Utc>) {
        self.password_hash = password_hash;
        self.touch(now);
    }

    pub fn set_role(&mut self, role: UserRole, now: DateTime<Utc>) {
        self.user_role = role;
        self.touch(now);
    }

    pub fn set_user_name(&mut self, user_name: UserName, now: DateTime<Utc>) {
        self.user_name = user_name;
        self.touch(now);
    }

    /// Verification status is kept across email changes.
    pub fn set_email(&mut self, email: Email, now: DateTime<Utc>) {
        self.email = email;
        self.touch(now);
    }

    pub fn enable_two_fa(&mut self, secret: TotpSecret, now: DateTime<Utc>) {
        self.two_fa_secret = Some(secret);
        self.two_fa_enabled = true;
        self.touch(now);
    }

    pub fn disable_two_fa(&mut self, now: DateTime<Utc>) {
        self.two_fa_secret = None;
        self.two_fa_enabled = false;
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_password::RawPassword;
    use chrono::Duration;
    use platform::password::PasswordHashParams;

    fn created_at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn sample() -> User {
        let raw = RawPassword::new("Secret123".to_string()).unwrap();
        User::new(
            UserName::new("alice").unwrap(),
            Email::new("alice@x.io").unwrap(),
            UserPassword::from_raw(&raw, &PasswordHashParams::minimal(), None).unwrap(),
            created_at(),
        )
    }

    #[test]
    fn test_new_user_defaults() {
        let user = sample();
        assert_eq!(user.user_role, UserRole::Author);
        assert!(!user.email_verified);
        assert!(!user.two_fa_enabled);
        assert!(user.two_fa_secret.is_none());
        assert!(!user.can_sign_in());
        assert_eq!(user.created_at, created_at());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_two_fa_secret_follows_flag() {
        let mut user = sample();
        user.enable_two_fa(TotpSecret::generate(), created_at());
        assert!(user.two_fa_enabled && user.two_fa_secret.is_some());

        user.disable_two_fa(created_at());
        assert!(!user.two_fa_enabled && user.two_fa_secret.is_none());
    }

    #[test]
    fn test_email_change_keeps_verification() {
        let mut user = sample();
        user.mark_email_verified(created_at());
        user.set_email(Email::new("alice@new.io").unwrap(), created_at());
        assert!(user.email_verified);
    }

    #[test]
    fn test_mutations_stamp_given_time() {
        let mut user = sample();
        let later = created_at() + Duration::hours(3);

        user.set_role(UserRole::Editor, later);
        assert_eq!(user.updated_at, later);
        assert_eq!(user.created_at, created_at());

        // Already verified: no change, no new stamp
        user.mark_email_verified(later);
        user.mark_email_verified(later + Duration::hours(1));
        assert_eq!(user.updated_at, later);
    }
}
