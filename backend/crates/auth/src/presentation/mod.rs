//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use extract::JsonBody;
pub use handlers::AuthAppState;
pub use middleware::{AuthenticatedUser, require_session};
pub use router::auth_router;
