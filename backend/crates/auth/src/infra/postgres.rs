//! PostgreSQL User Directory

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::user::User;
use crate::domain::repository::UserDirectory;
use crate::domain::value_object::{
    email::Email, totp_secret::TotpSecret, user_id::UserId, user_name::UserName,
    user_password::UserPassword, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Unique constraint names from `database/migrations/0001_users.sql`
const EMAIL_UNIQUE: &str = "users_email_key";
const USERNAME_UNIQUE: &str = "users_username_key";

const SELECT_USER: &str = r#"
    SELECT
        user_id,
        username,
        email,
        password_hash,
        user_role,
        email_verified,
        two_fa_enabled,
        two_fa_secret,
        created_at,
        updated_at
    FROM users
"#;

/// PostgreSQL-backed user directory
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserDirectory for PgUserDirectory {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                username,
                email,
                password_hash,
                user_role,
                email_verified,
                two_fa_enabled,
                two_fa_secret,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.user_role.code())
        .bind(user.email_verified)
        .bind(user.two_fa_enabled)
        .bind(user.two_fa_secret.as_ref().map(TotpSecret::as_base32))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE user_id = $1"))
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                username = $2,
                email = $3,
                password_hash = $4,
                user_role = $5,
                email_verified = $6,
                two_fa_enabled = $7,
                two_fa_secret = $8,
                updated_at = $9
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.user_role.code())
        .bind(user.email_verified)
        .bind(user.two_fa_enabled)
        .bind(user.two_fa_secret.as_ref().map(TotpSecret::as_base32))
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

/// Translate unique violations (23505) into domain conflicts
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(EMAIL_UNIQUE) => return AuthError::EmailTaken,
                Some(USERNAME_UNIQUE) => return AuthError::UsernameTaken,
                _ => {}
            }
        }
    }
    AuthError::Database(err)
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    user_role: String,
    email_verified: bool,
    two_fa_enabled: bool,
    two_fa_secret: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let password_hash = UserPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash in database: {e}")))?;

        let user_role = UserRole::from_code(&self.user_role).ok_or_else(|| {
            AuthError::Internal(format!("Invalid user_role in database: {}", self.user_role))
        })?;

        let two_fa_secret = self
            .two_fa_secret
            .map(TotpSecret::from_base32)
            .transpose()
            .map_err(|e| AuthError::Internal(format!("Invalid TOTP secret: {e}")))?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            user_name: UserName::from_db(self.username),
            email: Email::from_db(self.email),
            password_hash,
            user_role,
            email_verified: self.email_verified,
            two_fa_enabled: self.two_fa_enabled,
            two_fa_secret,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
