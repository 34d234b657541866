//! Domain Layer
//!
//! Contains entities, value objects, the token codec and repository traits.

pub mod entity;
pub mod repository;
pub mod token;
pub mod value_object;

// Re-exports
pub use entity::user::User;
pub use repository::UserDirectory;
pub use token::{TokenCodec, TokenError, TokenPurpose};
