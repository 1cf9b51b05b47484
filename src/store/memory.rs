//! In-process stores used by tests and local runs without Redis or Postgres.

use async_trait::async_trait;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use super::{EphemeralStore, IdentityStore, StoreError, StoreResult};
use crate::identity::models::{Identity, NewIdentity};

#[derive(Default)]
pub struct MemoryEphemeralStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryEphemeralStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl EphemeralStore for MemoryEphemeralStore {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let expires_at = Instant::now() + ttl;
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryIdentityStore {
    identities: Mutex<Vec<Identity>>,
}

impl MemoryIdentityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.identities.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.identities.lock().await.is_empty()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn insert(&self, identity: NewIdentity) -> StoreResult<Identity> {
        let mut identities = self.identities.lock().await;
        if identities
            .iter()
            .any(|existing| existing.email == identity.email || existing.phone_number == identity.phone_number)
        {
            return Err(StoreError::Conflict);
        }
        let id = identities.iter().map(|existing| existing.id).max().unwrap_or(0) + 1;
        let identity = Identity {
            id,
            first_name: identity.first_name,
            email: identity.email,
            phone_number: identity.phone_number,
            password_hash: identity.password_hash,
            role: identity.role,
            is_active: identity.is_active,
        };
        identities.push(identity.clone());
        Ok(identity)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        let identities = self.identities.lock().await;
        Ok(identities.iter().find(|identity| identity.email == email).cloned())
    }

    async fn find_by_phone(&self, phone_number: &str) -> StoreResult<Option<Identity>> {
        let identities = self.identities.lock().await;
        Ok(identities
            .iter()
            .find(|identity| identity.phone_number == phone_number)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Identity>> {
        let identities = self.identities.lock().await;
        Ok(identities.iter().find(|identity| identity.id == id).cloned())
    }

    async fn save(&self, identity: &Identity) -> StoreResult<()> {
        let mut identities = self.identities.lock().await;
        let existing = identities
            .iter_mut()
            .find(|existing| existing.id == identity.id)
            .ok_or_else(|| StoreError::Backend(anyhow::anyhow!("identity {} no longer exists", identity.id)))?;
        *existing = identity.clone();
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
