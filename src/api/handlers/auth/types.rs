//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub first_name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    /// `client` or `contractor`.
    pub role: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CodeSentResponse {
    pub message: String,
    pub phone_number: String,
    /// Seconds until the code expires.
    pub expires_in: u64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyRequest {
    pub phone_number: String,
    pub code: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetPasswordRequest {
    pub user_id: i64,
    #[serde(alias = "confirm_password")]
    pub current_password: String,
    pub new_password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ForgotPasswordRequest {
    pub phone_number: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetGrantResponse {
    pub user_id: i64,
    pub reset_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct NewPasswordRequest {
    pub user_id: i64,
    pub reset_token: String,
    pub new_password: String,
}
