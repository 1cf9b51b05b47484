//! # Tendergate (identity verification and access control)
//!
//! `tendergate` guards the tender marketplace API: it registers clients and
//! contractors, proves possession of their contact channel with one-time codes,
//! issues signed session tokens and authorizes every protected request against
//! a static role/path/method policy table.
//!
//! ## Registration
//!
//! Registration is a two-phase state machine. The first call validates the
//! input, hashes the password and stages a pending identity in the ephemeral
//! store (Redis) under the phone number for three minutes, then emails a
//! six digit code. The second call checks the code, commits the identity to
//! Postgres with `is_active = true` and purges the pending entry.
//!
//! ## Sessions
//!
//! Login returns an HS256 token carrying the email and role, valid for 48 hours.
//! There is no revocation list; expiry forces a new login.
//!
//! ## Authorization
//!
//! Protected routes pass through [`api::handlers::auth::middleware::authorize`],
//! which validates the bearer token and consults the [`identity::policy::PolicyTable`]
//! loaded once at start.

pub mod api;
pub mod cli;
pub mod email;
pub mod identity;
pub mod store;

#[cfg(test)]
mod testing;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
