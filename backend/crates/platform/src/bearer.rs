//! Bearer credential extraction
//!
//! Reads `Authorization: Bearer <token>` from request headers.

use axum::http::{HeaderMap, header};

/// Why a bearer credential could not be read
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("Missing Authorization header")]
    Missing,

    #[error("Authorization header is not a Bearer credential")]
    Malformed,
}

/// Extract the bearer token from request headers
///
/// The scheme is matched case-insensitively (RFC 7235). Surrounding
/// whitespace around the token is ignored; an empty token is malformed.
///
/// ## Returns
/// * `Ok(&str)` - The raw token
/// * `Err(BearerError)` - Header absent, not UTF-8/ASCII, wrong scheme or empty
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::Missing)?
        .to_str()
        .map_err(|_| BearerError::Malformed)?;

    let (scheme, token) = value.split_once(' ').ok_or(BearerError::Malformed)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(BearerError::Malformed);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(' ') {
        return Err(BearerError::Malformed);
    }

    Ok(token)
}
