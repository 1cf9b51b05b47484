//! Two-phase registration: stage and send a code, then confirm it.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{
    error::error_response,
    state::AuthState,
    types::{CodeSentResponse, MessageResponse, RegisterRequest, VerifyRequest},
};
use crate::identity::{Registration, Role};

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Verification code sent", body = CodeSentResponse),
        (status = 400, description = "Invalid phone, email, password or role", body = String),
        (status = 500, description = "Hashing, cache or delivery failure", body = String)
    ),
    tag = "auth"
)]
pub async fn register(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let Ok(role) = request.role.parse::<Role>() else {
        return (
            StatusCode::BAD_REQUEST,
            "Invalid role. Must be client or contractor".to_string(),
        )
            .into_response();
    };

    let registration = Registration {
        first_name: request.first_name,
        email: request.email,
        phone_number: request.phone_number,
        password: request.password,
        role,
    };

    match auth_state.service().request_registration(registration).await {
        Ok(ticket) => (
            StatusCode::CREATED,
            Json(CodeSentResponse {
                message: "Verification code sent successfully".to_string(),
                phone_number: ticket.phone_number,
                expires_in: ticket.expires_in.as_secs(),
            }),
        )
            .into_response(),
        Err(err) => error_response(err, StatusCode::BAD_REQUEST),
    }
}

#[utoipa::path(
    post,
    path = "/auth/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Identity verified and activated", body = MessageResponse),
        (status = 400, description = "Code missing, expired or wrong", body = String),
        (status = 409, description = "Email or phone number already registered", body = String),
        (status = 500, description = "Cache or database failure", body = String)
    ),
    tag = "auth"
)]
pub async fn verify(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyRequest>>,
) -> impl IntoResponse {
    let request: VerifyRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match auth_state
        .service()
        .verify_registration(&request.phone_number, &request.code)
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(MessageResponse::new("User verified and activated successfully")),
        )
            .into_response(),
        Err(err) => error_response(err, StatusCode::BAD_REQUEST),
    }
}
