//! Error taxonomy shared by the identity flows.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed input: bad phone, email, password or payload.
    #[error("{0}")]
    Validation(String),
    /// Missing identity, or an expired/absent pending record.
    #[error("{0}")]
    NotFound(&'static str),
    /// Bad credentials, inactive account or missing reset grant.
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("access denied")]
    Forbidden,
    /// Duplicate commit of an already registered email or phone.
    #[error("{0}")]
    Conflict(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => Self::Conflict("User with this email or phone number already exists"),
            StoreError::Backend(err) => Self::Internal(err),
        }
    }
}
