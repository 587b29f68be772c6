//! `ContentCache` implementation over Redis.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::Pool;
use redis::AsyncCommands;
use tracing::debug;

use bodybalance_storage::{CacheError, ContentCache};

use crate::config::RedisCacheConfig;

/// Number of keys requested per SCAN batch during bulk invalidation.
const SCAN_BATCH: usize = 100;

/// Redis-backed content cache.
#[derive(Clone)]
pub struct RedisCache {
    pool: Pool,
}

impl RedisCache {
    /// Creates the connection pool and verifies the server is reachable.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the pool cannot be created or the
    /// initial `PING` fails.
    pub async fn connect(config: &RedisCacheConfig) -> Result<Self, CacheError> {
        let mut redis_config = deadpool_redis::Config::from_url(&config.url);
        let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size);
        let timeout = Duration::from_millis(config.timeout_ms);
        pool_config.timeouts.wait = Some(timeout);
        pool_config.timeouts.create = Some(timeout);
        pool_config.timeouts.recycle = Some(timeout);
        redis_config.pool = Some(pool_config);

        let pool = redis_config
            .create_pool(Some(deadpool_redis::Runtime::Tokio1))
            .map_err(|e| CacheError::connection(e.to_string()))?;

        let cache = Self { pool };
        cache.ping().await?;

        debug!(url = %config.url, "Connected to Redis");
        Ok(cache)
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::connection(e.to_string()))
    }
}

#[async_trait]
impl ContentCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.connection().await?;
        // GET of a missing key is Ok(None): a miss, never a fault.
        conn.get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(|e| CacheError::transport(e.to_string()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let ttl_secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| CacheError::transport(e.to_string()))?;
        debug!(key = %key, ttl_secs, "cache set");
        Ok(())
    }

    async fn delete_matching(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut conn = self.connection().await?;
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        // Cursor-batched scan; the loop ends when the cursor returns to 0.
        // Deletions already performed are kept if a later batch fails.
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::transport(e.to_string()))?;

            if !keys.is_empty() {
                let removed: u64 = conn
                    .del(&keys)
                    .await
                    .map_err(|e| CacheError::transport(e.to_string()))?;
                deleted += removed;
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        debug!(pattern = %pattern, deleted, "cache invalidation scan complete");
        Ok(deleted)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| CacheError::transport(e.to_string()))?;
        Ok(())
    }
}
