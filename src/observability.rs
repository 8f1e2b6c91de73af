//! Observability hooks for cache-aside operations.
//!
//! Implement [`CacheMetrics`] to feed hit/miss/write/error events into a
//! monitoring system:
//!
//! ```ignore
//! use sales_analytics::observability::CacheMetrics;
//! use std::time::Duration;
//!
//! struct PrometheusMetrics;
//!
//! impl CacheMetrics for PrometheusMetrics {
//!     fn record_hit(&self, key: &str, duration: Duration) {
//!         // counter!("analytics_cache_hits").inc();
//!     }
//! }
//!
//! // let expander = CacheExpander::new(backend, ttl)
//! //     .with_metrics(Box::new(PrometheusMetrics));
//! ```
//!
//! Default behavior uses [`LogMetrics`], which logs via the `log` crate.
//! `record_error` fires for degraded cache reads and failed write-backs,
//! never for data-store failures (those propagate to the caller).

use std::time::Duration;

/// Trait for cache metrics collection.
pub trait CacheMetrics: Send + Sync {
    /// Record a cache hit.
    fn record_hit(&self, key: &str, duration: Duration) {
        debug!("Cache HIT: {} took {:?}", key, duration);
    }

    /// Record a cache miss.
    fn record_miss(&self, key: &str, duration: Duration) {
        debug!("Cache MISS: {} took {:?}", key, duration);
    }

    /// Record a cache write-back.
    fn record_set(&self, key: &str, duration: Duration) {
        debug!("Cache SET: {} took {:?}", key, duration);
    }

    /// Record a cache-store failure that was absorbed.
    fn record_error(&self, key: &str, error: &str) {
        warn!("Cache ERROR for {}: {}", key, error);
    }
}

/// Logs every event through the trait's default methods.
#[derive(Clone, Default)]
pub struct LogMetrics;

impl CacheMetrics for LogMetrics {}

/// Discards every event.
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl CacheMetrics for NoOpMetrics {
    fn record_hit(&self, _key: &str, _duration: Duration) {}
    fn record_miss(&self, _key: &str, _duration: Duration) {}
    fn record_set(&self, _key: &str, _duration: Duration) {}
    fn record_error(&self, _key: &str, _error: &str) {}
}
