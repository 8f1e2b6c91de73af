//! In-memory data store.
//!
//! Customers and products live in DashMaps keyed by id. Orders live in an
//! insertion-ordered vector so scans see them in the order they were written,
//! matching a document store's natural order.

use super::{DataStore, OrderFilter, OrderQuery};
use crate::error::{Error, Result};
use crate::model::{Customer, Order, Product};
use dashmap::DashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory implementation of [`DataStore`].
///
/// Clones share the same collections.
///
/// # Example
///
/// ```
/// use sales_analytics::model::Product;
/// use sales_analytics::store::InMemoryStore;
///
/// let store = InMemoryStore::new();
/// store.insert_product(Product {
///     id: "P1".to_string(),
///     name: "Desk Lamp".to_string(),
///     category: "Home".to_string(),
///     price: 24.5,
/// });
/// assert_eq!(store.product_count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    customers: Arc<DashMap<String, Customer>>,
    products: Arc<DashMap<String, Product>>,
    orders: Arc<RwLock<Vec<Order>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a customer.
    pub fn insert_customer(&self, customer: Customer) {
        self.customers.insert(customer.id.clone(), customer);
    }

    /// Insert or replace a product.
    pub fn insert_product(&self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    /// Remove a product from the catalog (orders keep referencing it).
    pub fn remove_product(&self, id: &str) -> Option<Product> {
        self.products.remove(id).map(|(_, product)| product)
    }

    /// Append an order without going through order placement.
    pub fn push_order(&self, order: Order) -> Result<()> {
        self.write_orders()?.push(order);
        Ok(())
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn order_count(&self) -> Result<usize> {
        Ok(self.read_orders()?.len())
    }

    fn read_orders(&self) -> Result<RwLockReadGuard<'_, Vec<Order>>> {
        self.orders
            .read()
            .map_err(|_| Error::Store("orders lock poisoned".to_string()))
    }

    fn write_orders(&self) -> Result<RwLockWriteGuard<'_, Vec<Order>>> {
        self.orders
            .write()
            .map_err(|_| Error::Store("orders lock poisoned".to_string()))
    }
}

impl DataStore for InMemoryStore {
    async fn find_customer(&self, id: &str) -> Result<Option<Customer>> {
        Ok(self.customers.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_product(&self, id: &str) -> Result<Option<Product>> {
        Ok(self.products.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_products(&self, ids: &[String]) -> Result<Vec<Product>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.products.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    async fn find_orders(&self, query: &OrderQuery) -> Result<Vec<Order>> {
        let mut matched: Vec<Order> = self
            .read_orders()?
            .iter()
            .filter(|order| query.filter.matches(order))
            .cloned()
            .collect();

        if query.newest_first {
            // Stable: equal dates keep insertion order
            matched.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        }

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(matched.into_iter().skip(skip).take(limit).collect())
    }

    async fn count_orders(&self, filter: &OrderFilter) -> Result<u64> {
        let count = self
            .read_orders()?
            .iter()
            .filter(|order| filter.matches(order))
            .count();
        Ok(count as u64)
    }

    async fn insert_order(&self, order: &Order) -> Result<()> {
        let mut orders = self.write_orders()?;
        if orders.iter().any(|existing| existing.id == order.id) {
            return Err(Error::Store(format!("duplicate order id {}", order.id)));
        }
        orders.push(order.clone());
        Ok(())
    }

    async fn replace_customers(&self, customers: Vec<Customer>) -> Result<usize> {
        self.customers.clear();
        let count = customers.len();
        for customer in customers {
            self.insert_customer(customer);
        }
        Ok(count)
    }

    async fn replace_products(&self, products: Vec<Product>) -> Result<usize> {
        self.products.clear();
        let count = products.len();
        for product in products {
            self.insert_product(product);
        }
        Ok(count)
    }

    async fn replace_orders(&self, orders: Vec<Order>) -> Result<usize> {
        let count = orders.len();
        *self.write_orders()? = orders;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderItem;
    use chrono::{TimeZone, Utc};

    fn order(id: &str, customer: &str, day: u32) -> Order {
        Order {
            id: id.to_string(),
            customer_id: customer.to_string(),
            order_date: Utc.with_ymd_and_hms(2024, 2, day, 12, 0, 0).unwrap(),
            status: "Completed".to_string(),
            items: vec![OrderItem {
                product_id: "P1".to_string(),
                quantity: 1,
            }],
            total: 10.0,
        }
    }

    fn product(id: &str) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            category: "Misc".to_string(),
            price: 1.0,
        }
    }

    #[tokio::test]
    async fn test_find_products_skips_unknown_ids() {
        let store = InMemoryStore::new();
        store.insert_product(product("P1"));
        store.insert_product(product("P2"));

        let found = store
            .find_products(&["P1".to_string(), "P404".to_string()])
            .await
            .expect("Failed to find products");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "P1");
    }

    #[tokio::test]
    async fn test_find_orders_sorted_and_windowed() {
        let store = InMemoryStore::new();
        for (id, day) in [("O1", 1), ("O2", 5), ("O3", 3), ("O4", 4)] {
            store.push_order(order(id, "C1", day)).expect("Failed to push");
        }
        store.push_order(order("O5", "C2", 9)).expect("Failed to push");

        let query = OrderQuery::new(OrderFilter::for_customer("C1"))
            .newest_first()
            .window(1, 2);
        let page = store.find_orders(&query).await.expect("Failed to query");

        let ids: Vec<&str> = page.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["O4", "O3"]);
    }

    #[tokio::test]
    async fn test_count_orders() {
        let store = InMemoryStore::new();
        store.push_order(order("O1", "C1", 1)).expect("Failed to push");
        store.push_order(order("O2", "C2", 2)).expect("Failed to push");

        let count = store
            .count_orders(&OrderFilter::for_customer("C1"))
            .await
            .expect("Failed to count");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_insert_order_rejects_duplicate_id() {
        let store = InMemoryStore::new();
        store
            .insert_order(&order("O1", "C1", 1))
            .await
            .expect("Failed to insert");

        let err = store.insert_order(&order("O1", "C1", 2)).await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[tokio::test]
    async fn test_replace_wipes_previous_contents() {
        let store = InMemoryStore::new();
        store.insert_product(product("OLD"));

        let loaded = store
            .replace_products(vec![product("P1"), product("P2")])
            .await
            .expect("Failed to replace");

        assert_eq!(loaded, 2);
        assert_eq!(store.product_count(), 2);
        assert!(store.find_product("OLD").await.expect("lookup").is_none());
    }
}
