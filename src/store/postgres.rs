//! PostgreSQL data store (SQLx).
//!
//! Orders keep their line items as a JSONB array, mirroring the document
//! shape of the original collections. A `seq` column preserves insertion
//! order so unsorted scans are deterministic.

use super::{DataStore, OrderFilter, OrderQuery};
use crate::error::Result;
use crate::model::{Customer, Order, OrderItem, Product};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, Postgres};
use sqlx::types::Json;
use sqlx::{FromRow, QueryBuilder};

const ORDER_SELECT: &str =
    "SELECT id, customer_id, order_date, status, items, total FROM orders";

#[derive(FromRow)]
struct OrderRow {
    id: String,
    customer_id: String,
    order_date: DateTime<Utc>,
    status: String,
    items: Json<Vec<OrderItem>>,
    total: f64,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            customer_id: row.customer_id,
            order_date: row.order_date,
            status: row.status,
            items: row.items.0,
            total: row.total,
        }
    }
}

/// Pure data layer - SQLx + PostgreSQL, no cache logic.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `database_url`.
    ///
    /// # Errors
    /// Returns `Error::Store` if the database is unreachable.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("Postgres store connected (max connections: {})", max_connections);
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Postgres migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Append `WHERE ...` for every set field of `filter`.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &OrderFilter) {
    let mut conditions = 0;
    let mut next_condition = |qb: &mut QueryBuilder<'_, Postgres>| {
        qb.push(if conditions == 0 { " WHERE " } else { " AND " });
        conditions += 1;
    };

    if let Some(customer_id) = &filter.customer_id {
        next_condition(qb);
        qb.push("customer_id = ").push_bind(customer_id.clone());
    }
    if let Some(status) = &filter.status {
        next_condition(qb);
        qb.push("status = ").push_bind(status.clone());
    }
    if let Some((start, end)) = filter.placed_between {
        next_condition(qb);
        qb.push("order_date BETWEEN ")
            .push_bind(start)
            .push(" AND ")
            .push_bind(end);
    }
}

fn order_query_builder(query: &OrderQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(ORDER_SELECT);
    push_filter(&mut qb, &query.filter);

    if query.newest_first {
        qb.push(" ORDER BY order_date DESC, seq ASC");
    } else {
        qb.push(" ORDER BY seq ASC");
    }
    if let Some(limit) = query.limit {
        qb.push(" LIMIT ").push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
    if query.skip > 0 {
        qb.push(" OFFSET ")
            .push_bind(i64::try_from(query.skip).unwrap_or(i64::MAX));
    }
    qb
}

impl DataStore for PostgresStore {
    async fn find_customer(&self, id: &str) -> Result<Option<Customer>> {
        let customer =
            sqlx::query_as::<_, Customer>("SELECT id, name, email FROM customers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(customer)
    }

    async fn find_product(&self, id: &str) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, category, price FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn find_products(&self, ids: &[String]) -> Result<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, category, price FROM products WHERE id = ANY($1)",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn find_orders(&self, query: &OrderQuery) -> Result<Vec<Order>> {
        let mut qb = order_query_builder(query);
        let rows = qb
            .build_query_as::<OrderRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn count_orders(&self, filter: &OrderFilter) -> Result<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders");
        push_filter(&mut qb, filter);

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn insert_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            "INSERT INTO orders (id, customer_id, order_date, status, items, total) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&order.id)
        .bind(&order.customer_id)
        .bind(order.order_date)
        .bind(&order.status)
        .bind(Json(&order.items))
        .bind(order.total)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn replace_customers(&self, customers: Vec<Customer>) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM customers").execute(&mut *tx).await?;

        for customer in &customers {
            sqlx::query("INSERT INTO customers (id, name, email) VALUES ($1, $2, $3)")
                .bind(&customer.id)
                .bind(&customer.name)
                .bind(&customer.email)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(customers.len())
    }

    async fn replace_products(&self, products: Vec<Product>) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM products").execute(&mut *tx).await?;

        for product in &products {
            sqlx::query("INSERT INTO products (id, name, category, price) VALUES ($1, $2, $3, $4)")
                .bind(&product.id)
                .bind(&product.name)
                .bind(&product.category)
                .bind(product.price)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(products.len())
    }

    async fn replace_orders(&self, orders: Vec<Order>) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM orders").execute(&mut *tx).await?;

        for order in &orders {
            sqlx::query(
                "INSERT INTO orders (id, customer_id, order_date, status, items, total) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(&order.id)
            .bind(&order.customer_id)
            .bind(order.order_date)
            .bind(&order.status)
            .bind(Json(&order.items))
            .bind(order.total)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(orders.len())
    }
}
