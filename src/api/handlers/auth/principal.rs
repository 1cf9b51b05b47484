//! Authenticated principal attached to requests by the authorization middleware.

use serde::Serialize;
use utoipa::ToSchema;

use crate::identity::{Role, SessionClaims};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct Principal {
    pub email: String,
    pub role: Role,
}

impl From<SessionClaims> for Principal {
    fn from(claims: SessionClaims) -> Self {
        Self {
            email: claims.email,
            role: claims.role,
        }
    }
}
