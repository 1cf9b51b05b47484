//! Test doubles shared by unit tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};
use tokio::sync::Mutex;

use crate::{
    email::Notifier,
    identity::policy::{PolicyEnforcer, PolicyError},
    identity::models::Role,
    store::{EphemeralStore, MemoryEphemeralStore, StoreResult},
};

#[derive(Clone, Debug)]
pub struct SentMessage {
    pub address: String,
    pub subject: String,
    pub body: String,
}

/// Captures outbound messages so tests can read the issued codes.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub async fn count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn last_address(&self) -> Option<String> {
        self.sent.lock().await.last().map(|m| m.address.clone())
    }

    pub async fn last_subject(&self) -> Option<String> {
        self.sent.lock().await.last().map(|m| m.subject.clone())
    }

    /// The six digit code in the most recent message.
    pub async fn last_code(&self) -> Result<String> {
        let sent = self.sent.lock().await;
        let message = sent.last().ok_or_else(|| anyhow!("no message sent"))?;
        message
            .body
            .split(|c: char| !c.is_ascii_digit())
            .find(|chunk| chunk.len() == 6)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("no code in message: {}", message.body))
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, address: &str, subject: &str, body: &str) -> Result<()> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(anyhow!("relay unavailable"));
        }
        self.sent.lock().await.push(SentMessage {
            address: address.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Memory cache whose deletes always fail.
#[derive(Default)]
pub struct FailingDeleteStore {
    inner: MemoryEphemeralStore,
}

#[async_trait]
impl EphemeralStore for FailingDeleteStore {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.inner.set_with_ttl(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn delete(&self, _key: &str) -> StoreResult<()> {
        Err(anyhow!("cache unavailable").into())
    }

    async fn ping(&self) -> StoreResult<()> {
        Err(anyhow!("cache unavailable").into())
    }
}

/// Policy engine that cannot reach a decision.
pub struct BrokenPolicy;

impl PolicyEnforcer for BrokenPolicy {
    fn check(&self, _role: Role, _path: &str, _method: &str) -> Result<bool, PolicyError> {
        Err(PolicyError::Evaluation("policy backend offline".to_string()))
    }
}
