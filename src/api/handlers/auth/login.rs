//! Credential login issuing a bearer session token.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::debug;

use super::{
    error::error_response,
    state::AuthState,
    types::{LoginRequest, TokenResponse},
};
use crate::identity::AuthError;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = TokenResponse),
        (status = 400, description = "Missing payload", body = String),
        (status = 401, description = "Invalid credentials", body = String),
        (status = 500, description = "Database or signing failure", body = String)
    ),
    tag = "auth"
)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match auth_state
        .service()
        .login(&request.email, &request.password)
        .await
    {
        Ok(token) => (StatusCode::OK, Json(TokenResponse { token })).into_response(),
        // Unknown, unverified and wrong-password logins look the same to callers.
        Err(AuthError::NotFound(reason) | AuthError::Unauthorized(reason)) => {
            debug!("login rejected: {reason}");
            (StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS.to_string()).into_response()
        }
        Err(err) => error_response(err, StatusCode::UNAUTHORIZED),
    }
}
