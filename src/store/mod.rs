//! Storage seams for the identity flows.
//!
//! Two stores back the state machine: a key/value cache with per-key TTL for
//! pending registrations, reset codes and reset grants, and a relational store
//! for committed identities. Each is a trait so the flows can run against the
//! in-memory doubles in tests.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::identity::models::{Identity, NewIdentity};

pub mod cache;
pub mod memory;
pub mod postgres;

pub use cache::RedisEphemeralStore;
pub use memory::{MemoryEphemeralStore, MemoryIdentityStore};
pub use postgres::PgIdentityStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    Conflict,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key prefix for staged registrations.
pub const REGISTER_PREFIX: &str = "register";
/// Key prefix for forgot-password codes.
pub const RESET_PREFIX: &str = "reset";
/// Key prefix for single-use reset grants.
pub const RESET_GRANT_PREFIX: &str = "reset-grant";

/// `<prefix>:<id>`
#[must_use]
pub fn cache_key(prefix: &str, id: &str) -> String {
    format!("{prefix}:{id}")
}

/// Key/value cache with per-key expiry. Keys are independent; there are no
/// multi-key transactions.
#[async_trait]
pub trait EphemeralStore: Send + Sync {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    async fn ping(&self) -> StoreResult<()>;
}

/// Durable identity persistence. Email and phone number are unique.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Returns [`StoreError::Conflict`] when the email or phone is taken.
    async fn insert(&self, identity: NewIdentity) -> StoreResult<Identity>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>>;

    async fn find_by_phone(&self, phone_number: &str) -> StoreResult<Option<Identity>>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Identity>>;

    /// Persist the mutable fields of an existing identity.
    async fn save(&self, identity: &Identity) -> StoreResult<()>;

    async fn ping(&self) -> StoreResult<()>;
}
