//! Error conversions and HTTP rendering for [`AppError`].
//!
//! Failure bodies share one envelope with success bodies:
//! `{ "success": false, "error": { "code", "message", "fields"? } }`.

use serde::Serialize;
use std::collections::BTreeMap;

use super::app_error::AppError;

/// 失敗レスポンスの JSON 表現
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope<'a> {
    pub success: bool,
    pub error: ErrorBody<'a>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub code: &'static str,
    pub message: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: &'a BTreeMap<String, String>,
}

impl AppError {
    /// レスポンス本文を組み立てる
    pub fn envelope(&self) -> ErrorEnvelope<'_> {
        ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: self.kind().code(),
                message: self.message(),
                fields: self.fields(),
            },
        }
    }
}

// ============================================================================
// SQLx conversions (feature-gated)
// ============================================================================

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found").with_source(err),
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                AppError::service_unavailable("Database unavailable").with_source(err)
            }
            sqlx::Error::Database(db_err) => {
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                let app_err = match db_err.code().as_deref() {
                    Some("23505") => AppError::conflict("Duplicate key value"),
                    Some("23502") | Some("23514") => AppError::bad_request("Constraint violation"),
                    Some("53000" | "53300" | "57P01" | "57P03") => {
                        AppError::service_unavailable("Database unavailable")
                    }
                    _ => AppError::internal("Database error"),
                };
                app_err.with_source(err)
            }
            _ => AppError::internal("Database error").with_source(err),
        }
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self.envelope())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_without_fields() {
        let err = AppError::unauthorized("Invalid token");
        let json = serde_json::to_value(err.envelope()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "error": { "code": "UNAUTHORIZED", "message": "Invalid token" }
            })
        );
    }

    #[test]
    fn test_envelope_with_fields() {
        let err = AppError::bad_request("Validation failed").with_field("username", "too short");
        let json = serde_json::to_value(err.envelope()).unwrap();
        assert_eq!(json["error"]["fields"]["username"], "too short");
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }
}
