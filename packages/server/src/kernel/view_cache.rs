//! Redis-backed view dedup cache.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::instrument;

use super::BaseViewCache;

/// View dedup keys in Redis, written with `SET .. NX EX` so the existence
/// check and the insert are a single round trip.
#[derive(Clone)]
pub struct RedisViewCache {
    conn: ConnectionManager,
}

impl RedisViewCache {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Invalid REDIS_URL")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl BaseViewCache for RedisViewCache {
    #[instrument(skip(self))]
    async fn insert_if_absent(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.conn.clone();

        // Redis rejects EX 0
        let ttl_secs = ttl.as_secs().max(1);

        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await
            .context("Redis SET NX failed")?;

        Ok(reply.is_some())
    }
}
