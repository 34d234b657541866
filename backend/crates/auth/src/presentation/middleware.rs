//! Auth Middleware
//!
//! Bearer-token gate for protected routes.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::bearer::extract_bearer;

use crate::domain::token::TokenCodec;
use crate::domain::value_object::{user_id::UserId, user_role::UserRole};
use crate::error::AuthError;

/// Caller identity, inserted into request extensions by [`require_session`]
///
/// `role` is the snapshot from the token and may be stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: UserRole,
}

/// Middleware that requires a valid session token
///
/// Every rejection is the same `401 Invalid token`; the reason is only logged.
pub async fn require_session(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let claims = match extract_bearer(req.headers()) {
        Ok(token) => codec.verify_session_token(token),
        Err(e) => {
            tracing::debug!(reason = %e, "Session rejected");
            return AuthError::InvalidSession.into_response();
        }
    };

    match claims {
        Ok(claims) => {
            req.extensions_mut().insert(AuthenticatedUser {
                user_id: claims.sub,
                role: claims.role,
            });
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(reason = %e, "Session rejected");
            AuthError::InvalidSession.into_response()
        }
    }
}
