//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of domain vocabulary:
//! - Common error types and result aliases
//! - The JSON response envelope shared by every endpoint
//! - Typed ID wrappers
//! - The clock abstraction used for anything time-bounded
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod clock;
pub mod id;
pub mod response;
