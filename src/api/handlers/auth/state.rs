//! Shared state for auth handlers and the authorization middleware.

use std::sync::Arc;

use crate::identity::{IdentityService, PolicyEnforcer};

/// Immutable after start; shared across requests behind an `Arc`.
pub struct AuthState {
    service: IdentityService,
    policy: Arc<dyn PolicyEnforcer>,
}

impl AuthState {
    #[must_use]
    pub fn new(service: IdentityService, policy: Arc<dyn PolicyEnforcer>) -> Self {
        Self { service, policy }
    }

    #[must_use]
    pub fn service(&self) -> &IdentityService {
        &self.service
    }

    #[must_use]
    pub fn policy(&self) -> &dyn PolicyEnforcer {
        self.policy.as_ref()
    }
}
