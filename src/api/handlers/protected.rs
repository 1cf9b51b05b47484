//! Role-gated landing routes. Every handler here sits behind
//! [`authorize`](super::auth::middleware::authorize), which attaches the
//! [`Principal`].

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};

use super::auth::{principal::Principal, types::MessageResponse};

#[utoipa::path(
    get,
    path = "/client/dashboard",
    responses(
        (status = 200, description = "Client landing page", body = MessageResponse),
        (status = 401, description = "Missing, expired or invalid token", body = String),
        (status = 403, description = "Role may not access this route", body = String)
    ),
    security(("bearer" = [])),
    tag = "client"
)]
pub async fn client_dashboard() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(MessageResponse::new("Welcome to the client dashboard")),
    )
}

#[utoipa::path(
    get,
    path = "/contractor/profile",
    responses(
        (status = 200, description = "Contractor landing page", body = MessageResponse),
        (status = 401, description = "Missing, expired or invalid token", body = String),
        (status = 403, description = "Role may not access this route", body = String)
    ),
    security(("bearer" = [])),
    tag = "contractor"
)]
pub async fn contractor_profile(principal: Extension<Principal>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(MessageResponse::new(format!(
            "Welcome to your profile {}",
            principal.email
        ))),
    )
}

#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "The authenticated principal", body = Principal),
        (status = 401, description = "Missing, expired or invalid token", body = String),
        (status = 403, description = "Role may not access this route", body = String)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    (StatusCode::OK, Json(principal))
}
