//! `AuthError` to HTTP response mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::identity::AuthError;

/// `not_found` differs per flow: an expired code is a bad request, a missing
/// account on an authenticated reset is a 404.
pub(super) fn error_response(err: AuthError, not_found: StatusCode) -> Response {
    match err {
        AuthError::Validation(message) => (StatusCode::BAD_REQUEST, message).into_response(),
        AuthError::NotFound(message) => (not_found, message.to_string()).into_response(),
        AuthError::Unauthorized(message) => {
            (StatusCode::UNAUTHORIZED, message.to_string()).into_response()
        }
        AuthError::Forbidden => (StatusCode::FORBIDDEN, "Access denied".to_string()).into_response(),
        AuthError::Conflict(message) => (StatusCode::CONFLICT, message.to_string()).into_response(),
        AuthError::Internal(err) => {
            error!("Auth request failed: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
                .into_response()
        }
    }
}
