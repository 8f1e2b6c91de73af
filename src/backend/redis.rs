//! Redis cache store implementation.

use super::CacheBackend;
use crate::error::{Error, Result};
use deadpool_redis::{redis::AsyncCommands, Config as PoolConfig, Connection, Pool, Runtime};
use std::time::Duration;

/// Pool statistics information.
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub connections: u32,
    pub idle_connections: u32,
}

/// Default Redis connection pool size.
pub const DEFAULT_POOL_SIZE: u32 = crate::config::DEFAULT_REDIS_POOL_SIZE;

/// Configuration for Redis backend.
#[derive(Clone, Debug)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: u32,
    pub pool_size: u32,
}

impl Default for RedisConfig {
    fn default() -> Self {
        RedisConfig {
            host: "localhost".to_string(),
            port: 6379,
            username: None,
            password: None,
            database: 0,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl RedisConfig {
    /// Build Redis connection string.
    pub fn connection_string(&self) -> String {
        if let Some(password) = &self.password {
            let username = self.username.as_deref().unwrap_or("default");
            format!(
                "redis://{}:{}@{}:{}/{}",
                username, password, self.host, self.port, self.database
            )
        } else {
            format!("redis://{}:{}/{}", self.host, self.port, self.database)
        }
    }
}

/// Redis cache store with connection pooling.
///
/// Entries are written with `SET key value EX ttl`; Redis expires them on its own.
///
/// # Example
///
/// ```no_run
/// # use sales_analytics::backend::{RedisBackend, RedisConfig, CacheBackend};
/// # use sales_analytics::Result;
/// # async fn example() -> Result<()> {
/// let backend = RedisBackend::new(RedisConfig::default())?;
/// let value = backend.get("customerSpending:C1").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RedisBackend {
    pool: Pool,
}

impl RedisBackend {
    /// Create new Redis backend from configuration.
    ///
    /// The pool connects lazily; the first command reports unreachable servers.
    ///
    /// # Errors
    /// Returns `Err` if pool creation fails.
    pub fn new(config: RedisConfig) -> Result<Self> {
        let backend = Self::build(&config.connection_string(), config.pool_size)?;
        info!("Redis cache initialized: {}:{}", config.host, config.port);
        Ok(backend)
    }

    /// Create from connection string with the default pool size.
    ///
    /// # Errors
    /// Returns `Err` if pool creation fails.
    pub fn from_connection_string(conn_str: &str) -> Result<Self> {
        Self::with_pool_size(conn_str, DEFAULT_POOL_SIZE)
    }

    /// Create from connection string with an explicit pool size.
    ///
    /// # Errors
    /// `Error::Config` for a zero pool size, `Error::Backend` if pool creation fails.
    pub fn with_pool_size(conn_str: &str, pool_size: u32) -> Result<Self> {
        let backend = Self::build(conn_str, pool_size)?;
        info!(
            "Redis cache initialized from connection string (pool size: {})",
            pool_size
        );
        Ok(backend)
    }

    fn build(conn_str: &str, pool_size: u32) -> Result<Self> {
        // A pool with no slots never hands out a connection
        if pool_size == 0 {
            return Err(Error::Config("Redis pool size must be greater than 0".to_string()));
        }

        let mut cfg = PoolConfig::from_url(conn_str);
        cfg.pool = Some(deadpool_redis::PoolConfig::new(pool_size as usize));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| Error::Backend(format!("Failed to create Redis pool: {}", e)))?;

        Ok(RedisBackend { pool })
    }

    /// Get current pool statistics.
    pub fn pool_stats(&self) -> PoolStats {
        let status = self.pool.status();
        PoolStats {
            connections: status.size as u32,
            idle_connections: status.available as u32,
        }
    }

    async fn connection(&self) -> Result<Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| Error::Backend(format!("Failed to get Redis connection: {}", e)))
    }
}

impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;

        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|e| Error::Backend(format!("Redis GET failed for key {}: {}", key, e)))?;

        if value.is_some() {
            debug!("Redis GET {} -> HIT", key);
        } else {
            debug!("Redis GET {} -> MISS", key);
        }

        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.connection().await?;

        match ttl {
            Some(duration) => {
                // EX rejects 0; sub-second TTLs round up
                let seconds = duration.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(|e| {
                        Error::Backend(format!("Redis SET EX failed for key {}: {}", key, e))
                    })?;
                debug!("Redis SET {} (TTL: {}s)", key, seconds);
            }
            None => {
                conn.set::<_, _, ()>(key, value).await.map_err(|e| {
                    Error::Backend(format!("Redis SET failed for key {}: {}", key, e))
                })?;
                debug!("Redis SET {}", key);
            }
        }

        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection().await?;

        let pong: String = deadpool_redis::redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| Error::Backend(format!("Redis PING failed: {}", e)))?;

        Ok(pong.contains("PONG"))
    }
}
