//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::token::TokenError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Field name → human-readable validation message
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    // ------------------------------------------------------------------------
    // Validation (400)
    // ------------------------------------------------------------------------
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Password rejected by the strength policy
    #[error("{0}")]
    PasswordValidation(String),

    /// Resend requested for an address with no account
    #[error("Invalid Email")]
    InvalidEmail,

    #[error("Email has been verified")]
    AlreadyVerified,

    // ------------------------------------------------------------------------
    // Authentication (401)
    // ------------------------------------------------------------------------
    /// Same message for unknown email and wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Verification or reset token failed to parse, verify or was expired
    #[error("Invalid token or token has expired")]
    InvalidOrExpiredToken,

    /// Reset token does not resolve to a registered user
    #[error("Invalid Token, Your token is not registered")]
    InvalidToken,

    /// Session credential rejected by the gate
    #[error("Invalid token")]
    InvalidSession,

    // ------------------------------------------------------------------------
    // Authorization (403)
    // ------------------------------------------------------------------------
    #[error("Email has not been verified. Please check your email.")]
    EmailNotVerified,

    #[error("You are not authorized to perform this action")]
    NotAuthorized,

    // ------------------------------------------------------------------------
    // Not found (404) / Conflict (409)
    // ------------------------------------------------------------------------
    #[error("User not found")]
    UserNotFound,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Username already taken")]
    UsernameTaken,

    // ------------------------------------------------------------------------
    // Infrastructure (500)
    // ------------------------------------------------------------------------
    /// A directory call did not finish within the configured timeout
    #[error("Directory call timed out")]
    DeadlineExceeded,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_)
            | AuthError::PasswordValidation(_)
            | AuthError::InvalidEmail
            | AuthError::AlreadyVerified => ErrorKind::BadRequest,
            AuthError::InvalidCredentials
            | AuthError::InvalidOrExpiredToken
            | AuthError::InvalidToken
            | AuthError::InvalidSession => ErrorKind::Unauthorized,
            AuthError::EmailNotVerified | AuthError::NotAuthorized => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken | AuthError::UsernameTaken => ErrorKind::Conflict,
            AuthError::DeadlineExceeded | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    ///
    /// Server errors carry a generic message; details stay in the logs.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Validation(fields) => fields.iter().fold(
                AppError::bad_request("Validation failed"),
                |err, (field, message)| err.with_field(*field, message.clone()),
            ),
            AuthError::PasswordValidation(message) => {
                AppError::bad_request(message.clone()).with_field("password", message.clone())
            }
            AuthError::EmailTaken => {
                AppError::conflict(self.to_string()).with_field("email", self.to_string())
            }
            AuthError::UsernameTaken => {
                AppError::conflict(self.to_string()).with_field("username", self.to_string())
            }
            _ if self.kind().is_server_error() => {
                AppError::internal("An internal error occurred. Please try again later.")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::DeadlineExceeded => {
                tracing::error!("User directory call exceeded its deadline");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::NotAuthorized => {
                tracing::warn!("Rejected action by unauthorized user");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(_: TokenError) -> Self {
        AuthError::InvalidOrExpiredToken
    }
}

/// Unreadable request bodies become a `body` field error
impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::Validation(FieldErrors::from([("body", rejection.body_text())]))
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Internal(format!("Background task failed: {err}"))
    }
}
