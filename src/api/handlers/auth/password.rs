//! Password change flows: authenticated reset and the forgot-password sequence.
//!
//! Forgot-password is three calls: `forgot-password` emails a code,
//! `verify-forgot-password` trades the code for a single-use reset token, and
//! `new-password` spends that token.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{
    error::error_response,
    state::AuthState,
    types::{
        CodeSentResponse, ForgotPasswordRequest, MessageResponse, NewPasswordRequest,
        ResetGrantResponse, ResetPasswordRequest, VerifyRequest,
    },
};

#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = MessageResponse),
        (status = 400, description = "New password fails the policy", body = String),
        (status = 401, description = "Current password is wrong", body = String),
        (status = 404, description = "No active user with this id", body = String),
        (status = 500, description = "Database failure", body = String)
    ),
    tag = "auth"
)]
pub async fn reset_password(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> impl IntoResponse {
    let request: ResetPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match auth_state
        .service()
        .reset_password(
            request.user_id,
            &request.current_password,
            &request.new_password,
        )
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse::new("Password reset successfully")),
        )
            .into_response(),
        Err(err) => error_response(err, StatusCode::NOT_FOUND),
    }
}

#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset code sent", body = CodeSentResponse),
        (status = 400, description = "Invalid phone number", body = String),
        (status = 404, description = "No user with this phone number", body = String),
        (status = 500, description = "Cache or delivery failure", body = String)
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> impl IntoResponse {
    let request: ForgotPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match auth_state
        .service()
        .forgot_password(&request.phone_number)
        .await
    {
        Ok(ticket) => (
            StatusCode::OK,
            Json(CodeSentResponse {
                message: "Verification code sent successfully".to_string(),
                phone_number: ticket.phone_number,
                expires_in: ticket.expires_in.as_secs(),
            }),
        )
            .into_response(),
        Err(err) => error_response(err, StatusCode::NOT_FOUND),
    }
}

#[utoipa::path(
    post,
    path = "/auth/verify-forgot-password",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Code accepted, reset token issued", body = ResetGrantResponse),
        (status = 400, description = "Code missing, expired or wrong", body = String),
        (status = 500, description = "Cache failure", body = String)
    ),
    tag = "auth"
)]
pub async fn verify_forgot_password(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyRequest>>,
) -> impl IntoResponse {
    let request: VerifyRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match auth_state
        .service()
        .verify_forgot_password(&request.phone_number, &request.code)
        .await
    {
        Ok(grant) => (
            StatusCode::OK,
            Json(ResetGrantResponse {
                user_id: grant.user_id,
                reset_token: grant.reset_token,
            }),
        )
            .into_response(),
        Err(err) => error_response(err, StatusCode::BAD_REQUEST),
    }
}

#[utoipa::path(
    post,
    path = "/auth/new-password",
    request_body = NewPasswordRequest,
    responses(
        (status = 200, description = "Forgotten password replaced", body = MessageResponse),
        (status = 400, description = "New password fails the policy", body = String),
        (status = 401, description = "Reset token missing, expired or already used", body = String),
        (status = 404, description = "No active user with this id", body = String),
        (status = 500, description = "Database failure", body = String)
    ),
    tag = "auth"
)]
pub async fn new_password(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<NewPasswordRequest>>,
) -> impl IntoResponse {
    let request: NewPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match auth_state
        .service()
        .set_new_password(request.user_id, &request.reset_token, &request.new_password)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse::new("Forgotten password updated successfully")),
        )
            .into_response(),
        Err(err) => error_response(err, StatusCode::NOT_FOUND),
    }
}
