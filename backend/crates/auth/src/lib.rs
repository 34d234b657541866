//! Identity (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, token codec, directory trait
//! - `application/` - Use cases and the notification queue
//! - `infra/` - User directory implementations (Postgres, in-memory)
//! - `presentation/` - HTTP handlers, DTOs, router, bearer gate
//!
//! ## Features
//! - Registration with email verification
//! - Email + password login issuing a JWT session token
//! - Password reset by mailed link
//! - TOTP secret enrollment
//! - Role-based access (Admin, Editor, Author)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, NFKC-normalized, optional pepper
//! - Purpose tokens (verification/reset) HMAC-signed with a derived key
//! - Session tokens are HS256 JWTs; the role claim is a login-time snapshot
//! - Login and reset-request do not reveal whether an email is registered

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::IdentityConfig;
pub use application::notification::{NotificationQueue, Notifier, RecordingNotifier};
pub use domain::token::TokenCodec;
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryUserDirectory, PgUserDirectory};
pub use presentation::{AuthAppState, AuthenticatedUser, auth_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
