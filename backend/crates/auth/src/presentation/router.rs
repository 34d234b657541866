//! Identity Router
//!
//! Mounted under `/api/users` by the API binary.

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::domain::repository::UserDirectory;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_session;

/// Create the identity router for any directory implementation
pub fn auth_router<R>(state: AuthAppState<R>) -> Router
where
    R: UserDirectory + Send + Sync + 'static,
{
    let protected = Router::new()
        .route("/me", get(handlers::current_user::<R>))
        .route(
            "/{id}",
            put(handlers::update_user::<R>).delete(handlers::delete_user::<R>),
        )
        .route("/{id}/role", put(handlers::change_role::<R>))
        .route("/{id}/2fa/enable", post(handlers::enable_two_factor::<R>))
        .route("/{id}/2fa/disable", post(handlers::disable_two_factor::<R>))
        .route_layer(middleware::from_fn_with_state(
            state.codec.clone(),
            require_session,
        ));

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .route(
            "/verify-email",
            get(handlers::verify_email_link::<R>).post(handlers::verify_email::<R>),
        )
        .route("/resend-email", post(handlers::resend_email::<R>))
        .route("/auth/forgot-password", post(handlers::forgot_password::<R>))
        .route(
            "/auth/validate-reset-token",
            post(handlers::validate_reset_token::<R>),
        )
        .route("/auth/reset-password", post(handlers::reset_password::<R>))
        .merge(protected)
        .with_state(state)
}
