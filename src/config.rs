//! Runtime configuration from environment variables.
//!
//! | Variable             | Default                           |
//! |----------------------|-----------------------------------|
//! | `DATABASE_URL`       | `postgres://localhost:5432/salesdb` |
//! | `REDIS_URL`          | `redis://localhost:6379/0`        |
//! | `CACHE_TTL_SECS`     | `300`                             |
//! | `HOST`               | `0.0.0.0`                         |
//! | `PORT`               | `4000`                            |
//! | `DB_MAX_CONNECTIONS` | `5`                               |
//! | `DATA_DIR`           | `csv_data`                        |
//! | `REDIS_POOL_SIZE`    | `16`                              |
//!
//! The binary loads `.env` with `dotenv` before calling [`AppConfig::from_env`].

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/salesdb";
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379/0";
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_REDIS_POOL_SIZE: u32 = 16;

/// Resolved settings for the server and the bulk loader.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub redis_url: String,
    pub cache_ttl: Duration,
    /// `HOST:PORT`
    pub listen_addr: String,
    pub max_db_connections: u32,
    pub redis_pool_size: u32,
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read through `lookup`, applying defaults for unset variables.
    ///
    /// # Errors
    ///
    /// `Error::Config` when a numeric variable does not parse, or when the TTL or
    /// the Redis pool size is zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ttl_secs: u64 = parse_or(&lookup, "CACHE_TTL_SECS", 300)?;
        if ttl_secs == 0 {
            return Err(Error::Config("CACHE_TTL_SECS must be greater than 0".to_string()));
        }

        let redis_pool_size: u32 = parse_or(&lookup, "REDIS_POOL_SIZE", DEFAULT_REDIS_POOL_SIZE)?;
        if redis_pool_size == 0 {
            return Err(Error::Config("REDIS_POOL_SIZE must be greater than 0".to_string()));
        }

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_or(&lookup, "PORT", DEFAULT_PORT)?;

        Ok(AppConfig {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            redis_url: lookup("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            cache_ttl: Duration::from_secs(ttl_secs),
            listen_addr: format!("{host}:{port}"),
            max_db_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            redis_pool_size,
            data_dir: PathBuf::from(lookup("DATA_DIR").unwrap_or_else(|| "csv_data".to_string())),
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{name} has invalid value '{raw}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.redis_url, DEFAULT_REDIS_URL);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.listen_addr, "0.0.0.0:4000");
        assert_eq!(config.max_db_connections, 5);
        assert_eq!(config.redis_pool_size, DEFAULT_REDIS_POOL_SIZE);
        assert_eq!(config.data_dir, PathBuf::from("csv_data"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("CACHE_TTL_SECS", "60"),
            ("REDIS_URL", "redis://cache:6379/2"),
            ("REDIS_POOL_SIZE", "4"),
        ])
        .unwrap();

        assert_eq!(config.redis_pool_size, 4);

        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.redis_url, "redis://cache:6379/2");
    }

    #[test]
    fn test_bad_numbers_are_rejected() {
        assert!(matches!(config_from(&[("PORT", "http")]), Err(Error::Config(_))));
        assert!(matches!(
            config_from(&[("DB_MAX_CONNECTIONS", "-1")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        assert!(matches!(
            config_from(&[("CACHE_TTL_SECS", "0")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_redis_pool_size_is_validated() {
        assert!(matches!(
            config_from(&[("REDIS_POOL_SIZE", "abc")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config_from(&[("REDIS_POOL_SIZE", "0")]),
            Err(Error::Config(_))
        ));
    }
}
