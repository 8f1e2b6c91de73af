//! Cache expander - the cache-aside engine behind every memoized query.
//!
//! ```text
//! fetch(key, compute)
//!   ├─ cache GET key ──► HIT (decodes) ───────────────► return cached payload
//!   │                 └► MISS / GET error / bad entry ─┐
//!   └─ compute() ◄────────────────────────────────────┘
//!        ├─ Err(e)   ──► propagate, nothing cached
//!        ├─ Ok(None) ──► return None, nothing cached
//!        └─ Ok(Some) ──► SET key EX ttl (failures logged) ──► return payload
//! ```
//!
//! The cache store is never a source of truth: any failure on its side turns
//! into a miss or a skipped write-back, so a degraded cache only costs latency.

use crate::backend::CacheBackend;
use crate::entity::CachedPayload;
use crate::error::Result;
use crate::observability::{CacheMetrics, LogMetrics};
use std::future::Future;
use std::time::{Duration, Instant};

/// Default time-to-live of a cached result: 5 minutes.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Cache-aside executor over a [`CacheBackend`].
///
/// # Example
///
/// ```ignore
/// use sales_analytics::{CacheExpander, backend::InMemoryBackend};
/// use std::time::Duration;
///
/// let expander = CacheExpander::new(InMemoryBackend::new(), Duration::from_secs(300));
/// let spending = expander
///     .fetch("customerSpending:C1", || async { summarize_from_db().await })
///     .await?;
/// ```
pub struct CacheExpander<B: CacheBackend> {
    backend: B,
    metrics: Box<dyn CacheMetrics>,
    ttl: Duration,
}

impl<B: CacheBackend> CacheExpander<B> {
    /// Create a new expander writing entries with a fixed `ttl`.
    pub fn new(backend: B, ttl: Duration) -> Self {
        CacheExpander {
            backend,
            metrics: Box::new(LogMetrics),
            ttl,
        }
    }

    /// Set custom metrics handler.
    pub fn with_metrics(mut self, metrics: Box<dyn CacheMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// TTL applied to every write-back.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get backend reference (for health checks and diagnostics).
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Return the cached payload under `key`, or run `compute` and memoize it.
    ///
    /// `compute` yields `Ok(None)` for "no data yet"; such results are handed
    /// back without being written, so a later call re-queries the source.
    ///
    /// # Errors
    ///
    /// Only errors raised by `compute` are returned. Cache-store failures
    /// are absorbed and reported to the metrics hook.
    pub async fn fetch<T, F, Fut>(&self, key: &str, compute: F) -> Result<Option<T>>
    where
        T: CachedPayload,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        if let Some(hit) = self.lookup::<T>(key).await {
            return Ok(Some(hit));
        }

        let computed = compute().await?;

        match &computed {
            Some(value) => self.store(key, value).await,
            None => debug!("{} produced no data; not caching", key),
        }

        Ok(computed)
    }

    /// Read and decode `key`. Every failure mode collapses to `None`.
    pub async fn lookup<T: CachedPayload>(&self, key: &str) -> Option<T> {
        let start = Instant::now();

        match self.backend.get(key).await {
            Ok(Some(bytes)) => match T::deserialize_from_cache(&bytes) {
                Ok(value) => {
                    self.metrics.record_hit(key, start.elapsed());
                    Some(value)
                }
                Err(e) => {
                    // Overwritten by the next successful write-back
                    self.metrics.record_error(key, &e.to_string());
                    None
                }
            },
            Ok(None) => {
                self.metrics.record_miss(key, start.elapsed());
                None
            }
            Err(e) => {
                warn!("Cache read failed for {}, falling back to data store", key);
                self.metrics.record_error(key, &e.to_string());
                None
            }
        }
    }

    /// Write `value` under `key` with the configured TTL. Failures are logged only.
    pub async fn store<T: CachedPayload>(&self, key: &str, value: &T) {
        let start = Instant::now();

        let bytes = match value.serialize_for_cache() {
            Ok(bytes) => bytes,
            Err(e) => {
                self.metrics.record_error(key, &e.to_string());
                return;
            }
        };

        match self.backend.set(key, bytes, Some(self.ttl)).await {
            Ok(()) => self.metrics.record_set(key, start.elapsed()),
            Err(e) => self.metrics.record_error(key, &e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::error::Error;
    use crate::report::CustomerSpending;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn spending(total: f64) -> CustomerSpending {
        CustomerSpending {
            customer_id: "C1".to_string(),
            total_spent: total,
            average_order_value: total,
            last_order_date: None,
        }
    }

    /// Cache store that is down for reads and/or writes.
    #[derive(Clone, Default)]
    struct BrokenBackend {
        fail_get: bool,
        fail_set: bool,
        inner: InMemoryBackend,
    }

    impl CacheBackend for BrokenBackend {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            if self.fail_get {
                return Err(Error::Backend("connection refused".to_string()));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
            if self.fail_set {
                return Err(Error::Backend("connection refused".to_string()));
            }
            self.inner.set(key, value, ttl).await
        }
    }

    #[derive(Clone, Default)]
    struct CountingMetrics {
        hits: Arc<Mutex<usize>>,
        misses: Arc<Mutex<usize>>,
        errors: Arc<Mutex<usize>>,
    }

    impl CacheMetrics for CountingMetrics {
        fn record_hit(&self, _key: &str, _duration: Duration) {
            *self.hits.lock().expect("Failed to lock hits") += 1;
        }

        fn record_miss(&self, _key: &str, _duration: Duration) {
            *self.misses.lock().expect("Failed to lock misses") += 1;
        }

        fn record_error(&self, _key: &str, _error: &str) {
            *self.errors.lock().expect("Failed to lock errors") += 1;
        }
    }

    #[tokio::test]
    async fn test_fetch_miss_computes_and_caches() {
        let backend = InMemoryBackend::new();
        let expander = CacheExpander::new(backend.clone(), DEFAULT_CACHE_TTL);

        let result = expander
            .fetch("customerSpending:C1", || async { Ok(Some(spending(35.0))) })
            .await
            .expect("Failed to fetch");

        assert_eq!(result, Some(spending(35.0)));
        assert!(backend
            .get("customerSpending:C1")
            .await
            .expect("Failed to get")
            .is_some());
    }

    #[tokio::test]
    async fn test_fetch_hit_skips_compute() {
        let expander = CacheExpander::new(InMemoryBackend::new(), DEFAULT_CACHE_TTL);
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for _ in 0..3 {
            let result = expander
                .fetch("customerSpending:C1", || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(spending(10.0)))
                })
                .await
                .expect("Failed to fetch");
            assert_eq!(result, Some(spending(10.0)));
        }

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_none_is_not_cached() {
        let backend = InMemoryBackend::new();
        let expander = CacheExpander::new(backend.clone(), DEFAULT_CACHE_TTL);

        let result: Option<CustomerSpending> = expander
            .fetch("customerSpending:C9", || async { Ok(None) })
            .await
            .expect("Failed to fetch");

        assert!(result.is_none());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_compute_error_propagates() {
        let backend = InMemoryBackend::new();
        let expander = CacheExpander::new(backend.clone(), DEFAULT_CACHE_TTL);

        let result: Result<Option<CustomerSpending>> = expander
            .fetch("customerSpending:C1", || async {
                Err(Error::Store("database down".to_string()))
            })
            .await;

        assert!(matches!(result, Err(Error::Store(_))));
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_degrades_when_cache_reads_fail() {
        let metrics = CountingMetrics::default();
        let backend = BrokenBackend {
            fail_get: true,
            fail_set: true,
            ..Default::default()
        };
        let expander =
            CacheExpander::new(backend, DEFAULT_CACHE_TTL).with_metrics(Box::new(metrics.clone()));

        let result = expander
            .fetch("customerSpending:C1", || async { Ok(Some(spending(5.0))) })
            .await
            .expect("Cache outage must not fail the query");

        assert_eq!(result, Some(spending(5.0)));
        // One failed read, one failed write-back
        assert_eq!(*metrics.errors.lock().expect("Failed to lock errors"), 2);
    }

    #[tokio::test]
    async fn test_fetch_recovers_from_corrupt_entry() {
        let backend = InMemoryBackend::new();
        backend
            .set("customerSpending:C1", b"not an envelope".to_vec(), None)
            .await
            .expect("Failed to set");

        let expander = CacheExpander::new(backend.clone(), DEFAULT_CACHE_TTL);
        let result = expander
            .fetch("customerSpending:C1", || async { Ok(Some(spending(7.0))) })
            .await
            .expect("Failed to fetch");
        assert_eq!(result, Some(spending(7.0)));

        // The corrupt entry has been replaced by a decodable one
        let cached = expander.lookup::<CustomerSpending>("customerSpending:C1").await;
        assert_eq!(cached, Some(spending(7.0)));
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let expander = CacheExpander::new(InMemoryBackend::new(), Duration::from_millis(50));
        let metrics = CountingMetrics::default();
        let expander = expander.with_metrics(Box::new(metrics.clone()));

        expander.store("customerSpending:C1", &spending(1.0)).await;
        assert!(expander
            .lookup::<CustomerSpending>("customerSpending:C1")
            .await
            .is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(expander
            .lookup::<CustomerSpending>("customerSpending:C1")
            .await
            .is_none());
        assert_eq!(*metrics.hits.lock().expect("Failed to lock hits"), 1);
        assert_eq!(*metrics.misses.lock().expect("Failed to lock misses"), 1);
    }

    #[test]
    fn test_default_ttl_is_five_minutes() {
        let expander = CacheExpander::new(InMemoryBackend::new(), DEFAULT_CACHE_TTL);
        assert_eq!(expander.ttl(), Duration::from_secs(300));
    }
}
