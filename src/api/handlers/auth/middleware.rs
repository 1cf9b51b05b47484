//! Bearer-token authorization for protected routes.
//!
//! Flow Overview:
//! 1) Read the `Authorization` header (`Bearer <token>` or the bare token).
//! 2) Validate signature and expiry.
//! 3) Ask the policy whether the token's role may call this path and method.
//! 4) Attach a [`Principal`] to the request and forward it.

use axum::{
    extract::{Extension, Request},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error};

use super::{principal::Principal, state::AuthState};
use crate::identity::TokenError;

/// Token from the `Authorization` header, without the optional `Bearer` scheme.
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => value,
    };
    if token.is_empty() || token.eq_ignore_ascii_case("bearer") {
        None
    } else {
        Some(token.to_string())
    }
}

pub async fn authorize(
    Extension(auth_state): Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer_token(request.headers()) else {
        return (
            StatusCode::UNAUTHORIZED,
            "Authorization header missing".to_string(),
        )
            .into_response();
    };

    let claims = match auth_state.service().tokens().validate(&token) {
        Ok(claims) => claims,
        Err(TokenError::Expired) => {
            return (StatusCode::UNAUTHORIZED, "Token expired".to_string()).into_response();
        }
        Err(TokenError::Invalid) => {
            return (StatusCode::UNAUTHORIZED, "Invalid token".to_string()).into_response();
        }
    };

    let path = request.uri().path().to_string();
    let method = request.method().as_str().to_string();
    match auth_state.policy().check(claims.role, &path, &method) {
        Ok(true) => {
            request.extensions_mut().insert(Principal::from(claims));
            next.run(request).await
        }
        Ok(false) => {
            debug!(role = %claims.role, path = %path, method = %method, "access denied");
            (StatusCode::FORBIDDEN, "Access denied".to_string()).into_response()
        }
        Err(err) => {
            error!("Policy evaluation failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to evaluate access policy".to_string(),
            )
                .into_response()
        }
    }
}
