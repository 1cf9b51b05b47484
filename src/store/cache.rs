//! Redis-backed [`EphemeralStore`].

use anyhow::Context;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client};
use std::time::Duration;
use tracing::{info_span, Instrument};

use super::{EphemeralStore, StoreResult};

/// Cache over a multiplexed, auto-reconnecting Redis connection.
#[derive(Clone)]
pub struct RedisEphemeralStore {
    conn: ConnectionManager,
}

impl RedisEphemeralStore {
    /// Connect to `redis_url` (e.g. `redis://127.0.0.1:6379/0`).
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the first connection fails.
    pub async fn connect(redis_url: &str) -> anyhow::Result<Self> {
        let client = Client::open(redis_url).context("Invalid Redis URL")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;
        Ok(Self { conn })
    }
}

fn command_span(operation: &'static str) -> tracing::Span {
    info_span!("cache.command", db.system = "redis", db.operation = operation)
}

#[async_trait]
impl EphemeralStore for RedisEphemeralStore {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        // Redis rejects EX 0.
        let seconds = ttl.as_secs().max(1);
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(seconds)
            .query_async::<_, ()>(&mut conn)
            .instrument(command_span("SET"))
            .await
            .context("failed to write cache entry")?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value = redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .instrument(command_span("GET"))
            .await
            .context("failed to read cache entry")?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        redis::cmd("DEL")
            .arg(key)
            .query_async::<_, i64>(&mut conn)
            .instrument(command_span("DEL"))
            .await
            .context("failed to delete cache entry")?;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .instrument(command_span("PING"))
            .await
            .context("cache ping failed")?;
        Ok(())
    }
}
