//! Request extractors

use axum::extract::FromRequest;

use crate::error::AuthError;

/// `axum::Json` whose rejection renders through the error envelope
///
/// A missing field, a wrong type or a missing `Content-Type` becomes
/// `400 { "success": false, "error": { ..., "fields": { "body": ... } } }`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AuthError))]
pub struct JsonBody<T>(pub T);
