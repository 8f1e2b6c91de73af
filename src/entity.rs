//! Trait for result payloads that may be memoized in the cache store.

use crate::error::Result;
use crate::report::{CustomerSpending, SalesAnalytics, TopProduct};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A query result that can be written to and read back from the cache.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use sales_analytics::CachedPayload;
///
/// #[derive(Clone, Serialize, Deserialize)]
/// pub struct RegionTotals {
///     pub region: String,
///     pub revenue: f64,
/// }
///
/// impl CachedPayload for RegionTotals {
///     fn cache_prefix() -> &'static str {
///         "regionTotals"
///     }
/// }
/// ```
pub trait CachedPayload: Serialize + DeserializeOwned + Send + Sync {
    /// Namespace of this payload's cache keys.
    ///
    /// Final cache key format: `"{prefix}:{part}[:{part}...]"`
    fn cache_prefix() -> &'static str;

    /// Encode for cache storage inside a versioned envelope.
    ///
    /// See `crate::serialization` for the format.
    fn serialize_for_cache(&self) -> Result<Vec<u8>> {
        crate::serialization::serialize_for_cache(self)
    }

    /// Decode from cache storage, validating magic and schema version.
    fn deserialize_from_cache(bytes: &[u8]) -> Result<Self> {
        crate::serialization::deserialize_from_cache(bytes)
    }
}

impl CachedPayload for CustomerSpending {
    fn cache_prefix() -> &'static str {
        "customerSpending"
    }
}

impl CachedPayload for Vec<TopProduct> {
    fn cache_prefix() -> &'static str {
        "topSellingProducts"
    }
}

impl CachedPayload for SalesAnalytics {
    fn cache_prefix() -> &'static str {
        "salesAnalytics"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spending_roundtrip() {
        let spending = CustomerSpending {
            customer_id: "C1".to_string(),
            total_spent: 120.0,
            average_order_value: 40.0,
            last_order_date: Some("2024-02-01T00:00:00.000Z".to_string()),
        };

        let bytes = spending.serialize_for_cache().unwrap();
        let decoded = CustomerSpending::deserialize_from_cache(&bytes).unwrap();
        assert_eq!(decoded, spending);
    }

    #[test]
    fn test_empty_top_products_roundtrip() {
        let empty: Vec<TopProduct> = Vec::new();
        let bytes = empty.serialize_for_cache().unwrap();
        let decoded = Vec::<TopProduct>::deserialize_from_cache(&bytes).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_prefixes_are_distinct() {
        let prefixes = [
            CustomerSpending::cache_prefix(),
            Vec::<TopProduct>::cache_prefix(),
            SalesAnalytics::cache_prefix(),
        ];
        assert_eq!(prefixes, ["customerSpending", "topSellingProducts", "salesAnalytics"]);
    }
}
