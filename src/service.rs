//! Sales query service: the cache-aside analytics layer plus order placement.
//!
//! Wraps a [`DataStore`] and a [`CacheExpander`] in `Arc` so the service can be
//! cloned into every request handler without extra locking.

use crate::backend::CacheBackend;
use crate::dates::parse_timestamp;
use crate::error::{Error, Result};
use crate::expander::CacheExpander;
use crate::key::CacheKeyBuilder;
use crate::model::{Order, OrderItem, ORDER_STATUS_COMPLETED};
use crate::pipeline;
use crate::report::{
    CustomerOrdersPage, CustomerSpending, PlaceOrderInput, PlaceOrderPayload, SalesAnalytics,
    TopProduct,
};
use crate::store::{DataStore, OrderFilter, OrderQuery};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Analytics queries and order placement over injected stores.
///
/// # Example
///
/// ```ignore
/// use sales_analytics::{SalesService, backend::InMemoryBackend, store::InMemoryStore};
/// use std::time::Duration;
///
/// let service = SalesService::new(
///     InMemoryStore::new(),
///     InMemoryBackend::new(),
///     Duration::from_secs(300),
/// );
///
/// let top = service.top_selling_products(5).await?;
/// ```
pub struct SalesService<S: DataStore, B: CacheBackend> {
    store: Arc<S>,
    cache: Arc<CacheExpander<B>>,
}

impl<S: DataStore, B: CacheBackend> Clone for SalesService<S, B> {
    fn clone(&self) -> Self {
        SalesService {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<S: DataStore, B: CacheBackend> SalesService<S, B> {
    /// Create a service caching results in `backend` for `ttl`.
    pub fn new(store: S, backend: B, ttl: Duration) -> Self {
        Self::with_expander(store, CacheExpander::new(backend, ttl))
    }

    /// Create a service around a pre-configured expander (custom metrics).
    pub fn with_expander(store: S, expander: CacheExpander<B>) -> Self {
        SalesService {
            store: Arc::new(store),
            cache: Arc::new(expander),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn expander(&self) -> &CacheExpander<B> {
        &self.cache
    }

    /// Lifetime spend of a customer, across orders of every status.
    ///
    /// `None` when the customer has no orders; that answer is not cached.
    pub async fn customer_spending(&self, customer_id: &str) -> Result<Option<CustomerSpending>> {
        let customer_id = require_customer_id(customer_id)?;
        let key = CacheKeyBuilder::customer_spending(customer_id);

        self.cache
            .fetch(&key, || async move {
                let query = OrderQuery::new(OrderFilter::for_customer(customer_id));
                let orders = self.store.find_orders(&query).await?;
                Ok(pipeline::summarize_spending(customer_id, &orders))
            })
            .await
    }

    /// The `limit` products with the highest quantity sold across all orders.
    ///
    /// Empty rankings are cached like any other.
    pub async fn top_selling_products(&self, limit: i32) -> Result<Vec<TopProduct>> {
        let limit = positive("limit", limit)? as usize;
        let key = CacheKeyBuilder::top_selling_products(limit);

        let ranking = self
            .cache
            .fetch(&key, || async move {
                let orders = self.store.find_orders(&OrderQuery::new(OrderFilter::all())).await?;
                let ranked = pipeline::rank_by_quantity(&orders, limit);
                let products = self.store.find_products(&pipeline::ranked_ids(&ranked)).await?;
                Ok(Some(pipeline::attach_names(ranked, &products)))
            })
            .await?;

        Ok(ranking.unwrap_or_default())
    }

    /// Revenue of completed orders placed inside `[start_date, end_date]`.
    ///
    /// A window with no priceable completed order yields a zero result that is
    /// not cached.
    pub async fn sales_analytics(&self, start_date: &str, end_date: &str) -> Result<SalesAnalytics> {
        let start = parse_timestamp(start_date)?;
        let end = parse_timestamp(end_date)?;
        let key = CacheKeyBuilder::sales_analytics(&start, &end);

        let analytics = self
            .cache
            .fetch(&key, || async move {
                let filter = OrderFilter::all()
                    .with_status(ORDER_STATUS_COMPLETED)
                    .placed_between(start, end);
                let orders = self.store.find_orders(&OrderQuery::new(filter)).await?;
                let products = self
                    .store
                    .find_products(&pipeline::referenced_product_ids(&orders))
                    .await?;
                let lines = pipeline::revenue_lines(&orders, &products);
                Ok(pipeline::summarize_revenue(&lines))
            })
            .await?;

        Ok(analytics.unwrap_or_else(SalesAnalytics::empty))
    }

    /// One page of a customer's orders, newest first. Never cached.
    pub async fn customer_orders(
        &self,
        customer_id: &str,
        page: i32,
        page_size: i32,
    ) -> Result<CustomerOrdersPage> {
        let customer_id = require_customer_id(customer_id)?;
        let page = positive("page", page)?;
        let page_size = positive("pageSize", page_size)?;

        let (skip, limit) = pipeline::page_window(page, page_size);
        let filter = OrderFilter::for_customer(customer_id);
        let query = OrderQuery::new(filter.clone())
            .newest_first()
            .window(skip, limit);

        let (total_count, orders) = futures::try_join!(
            self.store.count_orders(&filter),
            self.store.find_orders(&query)
        )?;

        Ok(CustomerOrdersPage {
            orders: orders.into_iter().map(pipeline::to_customer_order).collect(),
            total_count,
            page,
            page_size,
            total_pages: pipeline::total_pages(total_count, page_size),
        })
    }

    /// Validate and persist a new order.
    ///
    /// Customer and product ids are trimmed before lookup. Unknown customers
    /// and products produce an unsuccessful payload and write nothing. Not idempotent: every successful call inserts a new
    /// order. Cached spending summaries are left to expire on their own.
    pub async fn place_order(&self, input: PlaceOrderInput) -> Result<PlaceOrderPayload> {
        let customer_id = require_customer_id(&input.customer_id)?;
        let quantities = input
            .items
            .iter()
            .map(|item| positive("quantity", item.quantity))
            .collect::<Result<Vec<u32>>>()?;

        if self.store.find_customer(customer_id).await?.is_none() {
            info!("Rejected order: unknown customer {}", customer_id);
            return Ok(PlaceOrderPayload::rejected("Customer not found"));
        }

        let mut lines = Vec::with_capacity(input.items.len());
        for (item, quantity) in input.items.iter().zip(quantities) {
            let product_id = item.product_id.trim();
            match self.store.find_product(product_id).await? {
                Some(product) => lines.push((product, quantity)),
                None => {
                    info!("Rejected order: unknown product {}", product_id);
                    return Ok(PlaceOrderPayload::rejected(format!(
                        "Product not found: {}",
                        product_id
                    )));
                }
            }
        }

        let order = Order {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            order_date: Utc::now(),
            status: ORDER_STATUS_COMPLETED.to_string(),
            items: lines
                .iter()
                .map(|(product, quantity)| OrderItem {
                    product_id: product.id.clone(),
                    quantity: *quantity,
                })
                .collect(),
            total: pipeline::order_total(&lines),
        };

        self.store.insert_order(&order).await?;
        info!(
            "Order {} placed for customer {} (total {:.2})",
            order.id, order.customer_id, order.total
        );

        Ok(PlaceOrderPayload::placed(order.id))
    }

    /// Whether the cache store answers. The service works either way.
    pub async fn cache_health(&self) -> bool {
        match self.cache.backend().health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!("Cache health check failed: {}", e);
                false
            }
        }
    }
}

fn require_customer_id(customer_id: &str) -> Result<&str> {
    let trimmed = customer_id.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("customerId must not be empty".to_string()));
    }
    Ok(trimmed)
}

fn positive(name: &str, value: i32) -> Result<u32> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| Error::Validation(format!("{name} must be a positive integer, got {value}")))
}
