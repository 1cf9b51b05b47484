//! API handlers for tendergate.
//!
//! `auth` holds the open registration/login/password endpoints together with
//! the authorization middleware; `protected` holds the role-gated routes.

pub mod auth;
pub mod health;
pub mod protected;
pub mod root;
