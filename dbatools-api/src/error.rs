use axum::http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use common_rbac::{AuthError, GuardError};

const PG_UNIQUE_VIOLATION: &str = "23505";
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request payload failed basic validation.
    #[error("{0}")]
    Invalid(String),
    /// Uniqueness violation on create. The message names what collided.
    #[error("{0}")]
    Conflict(String),
    /// All login failure causes collapse to this one outward kind so the
    /// caller cannot distinguish missing user, wrong password, or a
    /// disabled account.
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Token(#[from] AuthError),
    #[error("storage failure")]
    Storage(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

impl From<GuardError> for ApiError {
    fn from(value: GuardError) -> Self {
        let (_, message) = value.into_response();
        ApiError::Forbidden(message)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Token(err) = self {
            return err.into_response();
        }

        let (status, code, message) = match self {
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "CONFLICT", message),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid username or password".to_string(),
            ),
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, "FORBIDDEN", message),
            ApiError::NotFound(entity) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} not found"),
            ),
            ApiError::Storage(err) => {
                error!(error = ?err, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERVER_ERROR",
                    "Internal server error".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                error!(detail = %detail, "internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERVER_ERROR",
                    "Internal server error".to_string(),
                )
            }
            ApiError::Token(_) => unreachable!("handled above"),
        };

        let body = ErrorBody { code, message };
        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Listing bounds: skip must be non-negative, limit within 1..=max.
/// Out-of-range values are rejected, not clamped.
pub fn validate_page(offset: i64, limit: i64, max: i64) -> Result<(), ApiError> {
    if !(1..=max).contains(&limit) {
        return Err(ApiError::Invalid(format!(
            "limit must be between 1 and {max}"
        )));
    }
    if offset < 0 {
        return Err(ApiError::Invalid("skip must be non-negative".to_string()));
    }
    Ok(())
}

/// Translate a unique-constraint violation into a Conflict naming `what`.
/// The database constraint is the sole source of truth for "already
/// exists"; callers never pre-check.
pub fn conflict_on_unique(err: sqlx::Error, what: &str) -> ApiError {
    if is_violation(&err, PG_UNIQUE_VIOLATION) {
        return ApiError::Conflict(format!("{what} already exists"));
    }
    ApiError::Storage(err)
}

/// Membership inserts can fail two ways: duplicate pair (unique) or a
/// dangling user/role id (foreign key).
pub fn membership_insert_error(err: sqlx::Error) -> ApiError {
    if is_violation(&err, PG_UNIQUE_VIOLATION) {
        return ApiError::Conflict("User already holds this role".to_string());
    }
    if is_violation(&err, PG_FOREIGN_KEY_VIOLATION) {
        return ApiError::NotFound("User or role");
    }
    ApiError::Storage(err)
}

fn is_violation(err: &sqlx::Error, code: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(code),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds_outside_the_contract_are_invalid() {
        assert!(validate_page(0, 1, 1000).is_ok());
        assert!(validate_page(10, 1000, 1000).is_ok());
        assert!(matches!(
            validate_page(0, 0, 1000),
            Err(ApiError::Invalid(_))
        ));
        assert!(matches!(
            validate_page(0, 1001, 1000),
            Err(ApiError::Invalid(_))
        ));
        assert!(matches!(
            validate_page(-1, 10, 1000),
            Err(ApiError::Invalid(_))
        ));
    }
}
