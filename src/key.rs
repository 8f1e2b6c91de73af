//! Cache key derivation.
//!
//! Keys are a pure function of the operation and its arguments, so equal
//! requests always land on the same entry.

use crate::dates::to_iso;
use crate::entity::CachedPayload;
use crate::report::{CustomerSpending, SalesAnalytics, TopProduct};
use chrono::{DateTime, Utc};

/// Builder for cache keys.
pub struct CacheKeyBuilder;

impl CacheKeyBuilder {
    /// Build full cache key from payload type and a single argument.
    pub fn build<T: CachedPayload>(id: &dyn std::fmt::Display) -> String {
        format!("{}:{}", T::cache_prefix(), id)
    }

    /// Build composite key from multiple parts.
    pub fn build_composite(parts: &[&str]) -> String {
        parts.join(":")
    }

    /// `customerSpending:{customerId}`
    pub fn customer_spending(customer_id: &str) -> String {
        Self::build::<CustomerSpending>(&customer_id)
    }

    /// `topSellingProducts:{limit}`
    pub fn top_selling_products(limit: usize) -> String {
        Self::build::<Vec<TopProduct>>(&limit)
    }

    /// `salesAnalytics:{startIso}:{endIso}`
    ///
    /// Bounds are normalised first, so `2024-01-01` and
    /// `2024-01-01T00:00:00Z` share an entry.
    pub fn sales_analytics(start: &DateTime<Utc>, end: &DateTime<Utc>) -> String {
        let start = to_iso(start);
        let end = to_iso(end);
        Self::build_composite(&[SalesAnalytics::cache_prefix(), &start, &end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_timestamp;

    #[test]
    fn test_customer_spending_key() {
        assert_eq!(
            CacheKeyBuilder::customer_spending("cust_42"),
            "customerSpending:cust_42"
        );
    }

    #[test]
    fn test_top_selling_products_key() {
        assert_eq!(
            CacheKeyBuilder::top_selling_products(5),
            "topSellingProducts:5"
        );
    }

    #[test]
    fn test_sales_analytics_key_is_normalised() {
        let a = CacheKeyBuilder::sales_analytics(
            &parse_timestamp("2024-01-01").unwrap(),
            &parse_timestamp("2024-01-31").unwrap(),
        );
        let b = CacheKeyBuilder::sales_analytics(
            &parse_timestamp("2024-01-01T00:00:00Z").unwrap(),
            &parse_timestamp("2024-01-31T00:00:00.000Z").unwrap(),
        );
        assert_eq!(a, b);
        assert!(a.starts_with("salesAnalytics:2024-01-01T00:00:00.000Z:"));
    }

    #[test]
    fn test_composite_key_builder() {
        let key = CacheKeyBuilder::build_composite(&["salesAnalytics", "a", "b"]);
        assert_eq!(key, "salesAnalytics:a:b");
    }
}
