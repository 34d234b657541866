//! API DTOs (Data Transfer Objects)
//!
//! Field names are snake_case on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::user::User;
use crate::domain::value_object::{user_id::UserId, user_role::UserRole};

// ============================================================================
// Register / Login
// ============================================================================

/// Register request
///
/// A `role` sent by the client is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

// ============================================================================
// Email verification / password reset
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

/// `?token=` on the verification link
#[derive(Debug, Clone, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[serde(alias = "password")]
    pub new_password: String,
}

// ============================================================================
// Profile / role / 2FA
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnableTwoFactorRequest {
    /// Base32 secret; generated when absent
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TwoFactorResponse {
    pub secret: String,
    pub otpauth_url: String,
}

// ============================================================================
// User
// ============================================================================

/// Public view of an account. The password digest and TOTP secret never leave.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub email_verified: bool,
    pub two_fa_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id,
            username: user.user_name.as_str().to_string(),
            email: user.email.as_str().to_string(),
            role: user.user_role,
            email_verified: user.email_verified,
            two_fa_enabled: user.two_fa_enabled,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
