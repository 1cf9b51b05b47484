//! Identity domain: records, credentials, one-time codes, sessions and policy.

pub mod code;
pub mod credentials;
pub mod error;
pub mod models;
pub mod policy;
pub mod service;
pub mod token;
pub mod validation;

pub use error::AuthError;
pub use models::{Identity, NewIdentity, PendingIdentity, Role};
pub use policy::{PolicyEnforcer, PolicyError, PolicyTable};
pub use service::{CodeTicket, IdentityConfig, IdentityService, Registration, ResetGrant};
pub use token::{SessionClaims, TokenError, TokenService};
