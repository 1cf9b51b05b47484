//! Auth handlers and supporting modules.
//!
//! Registration and forgot-password are both code-confirmed: a six digit code
//! is staged in the cache and emailed, and only a matching code moves the flow
//! forward. Login returns a bearer token consumed by [`middleware::authorize`].

mod error;
pub mod login;
pub mod middleware;
pub mod password;
pub mod principal;
pub mod register;
mod state;
pub mod types;

pub use state::AuthState;
