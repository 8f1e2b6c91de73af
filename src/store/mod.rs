//! Data store abstraction for customers, products and orders.
//!
//! The `DataStore` trait decouples the query layer from a specific database.
//! It exposes only the primitive reads the aggregation pipelines need
//! (filter, sort, skip, limit, id lookups) plus the order write and the bulk
//! loader's wipe-and-replace operations.
//!
//! # Implementing DataStore
//!
//! - [`InMemoryStore`]: DashMap-backed, for tests and demos
//! - `PostgresStore` (feature `postgres`): SQLx + PostgreSQL
//!
//! Return `Err` only for infrastructure failures. A lookup that finds nothing
//! is `Ok(None)` / an empty vector.

use crate::error::Result;
use crate::model::{Customer, Order, Product};
use chrono::{DateTime, Utc};
use std::future::Future;

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

/// Predicate over orders. Unset fields match everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderFilter {
    pub customer_id: Option<String>,
    pub status: Option<String>,
    /// Inclusive `[start, end]` bounds on `order_date`.
    pub placed_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl OrderFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_customer(customer_id: impl Into<String>) -> Self {
        OrderFilter {
            customer_id: Some(customer_id.into()),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn placed_between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.placed_between = Some((start, end));
        self
    }

    /// Evaluate the predicate against one order.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(customer_id) = &self.customer_id {
            if &order.customer_id != customer_id {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if &order.status != status {
                return false;
            }
        }
        if let Some((start, end)) = &self.placed_between {
            if order.order_date < *start || order.order_date > *end {
                return false;
            }
        }
        true
    }
}

/// A filtered, optionally sorted and windowed read of the orders collection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderQuery {
    pub filter: OrderFilter,
    /// Sort by `order_date` descending.
    pub newest_first: bool,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl OrderQuery {
    pub fn new(filter: OrderFilter) -> Self {
        OrderQuery {
            filter,
            ..Self::default()
        }
    }

    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    pub fn window(mut self, skip: u64, limit: u64) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }
}

/// Trait for data store implementations.
///
/// Futures are `Send` so the query layer can run on a multi-threaded runtime.
pub trait DataStore: Send + Sync + 'static {
    /// Fetch one customer by id.
    fn find_customer(&self, id: &str) -> impl Future<Output = Result<Option<Customer>>> + Send;

    /// Fetch one product by id.
    fn find_product(&self, id: &str) -> impl Future<Output = Result<Option<Product>>> + Send;

    /// Fetch every product whose id is in `ids`. Unknown ids are skipped;
    /// result order is unspecified.
    fn find_products(&self, ids: &[String])
        -> impl Future<Output = Result<Vec<Product>>> + Send;

    /// Run an order query.
    fn find_orders(&self, query: &OrderQuery) -> impl Future<Output = Result<Vec<Order>>> + Send;

    /// Count orders matching `filter`.
    fn count_orders(&self, filter: &OrderFilter) -> impl Future<Output = Result<u64>> + Send;

    /// Persist a new order.
    fn insert_order(&self, order: &Order) -> impl Future<Output = Result<()>> + Send;

    /// Wipe the customers collection and load `customers`. Returns the count loaded.
    fn replace_customers(
        &self,
        customers: Vec<Customer>,
    ) -> impl Future<Output = Result<usize>> + Send;

    /// Wipe the products collection and load `products`. Returns the count loaded.
    fn replace_products(&self, products: Vec<Product>)
        -> impl Future<Output = Result<usize>> + Send;

    /// Wipe the orders collection and load `orders`. Returns the count loaded.
    fn replace_orders(&self, orders: Vec<Order>) -> impl Future<Output = Result<usize>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ORDER_STATUS_COMPLETED;
    use chrono::TimeZone;

    fn order(customer: &str, status: &str, day: u32) -> Order {
        Order {
            id: format!("{customer}-{day}"),
            customer_id: customer.to_string(),
            order_date: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            status: status.to_string(),
            items: Vec::new(),
            total: 0.0,
        }
    }

    #[test]
    fn test_filter_all_matches_everything() {
        assert!(OrderFilter::all().matches(&order("C1", "Pending", 3)));
    }

    #[test]
    fn test_filter_customer_and_status() {
        let filter = OrderFilter::for_customer("C1").with_status(ORDER_STATUS_COMPLETED);
        assert!(filter.matches(&order("C1", "Completed", 3)));
        assert!(!filter.matches(&order("C2", "Completed", 3)));
        assert!(!filter.matches(&order("C1", "Pending", 3)));
    }

    #[test]
    fn test_filter_date_bounds_are_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap();
        let filter = OrderFilter::all().placed_between(start, end);

        assert!(filter.matches(&order("C1", "Completed", 10)));
        assert!(filter.matches(&order("C1", "Completed", 20)));
        assert!(!filter.matches(&order("C1", "Completed", 9)));
        assert!(!filter.matches(&order("C1", "Completed", 21)));
    }

    #[test]
    fn test_query_builder() {
        let query = OrderQuery::new(OrderFilter::for_customer("C1"))
            .newest_first()
            .window(20, 10);
        assert!(query.newest_first);
        assert_eq!(query.skip, 20);
        assert_eq!(query.limit, Some(10));
    }
}
