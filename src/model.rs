//! Document types held by the data store.
//!
//! Every entity is a fixed struct; records carrying extra or missing fields
//! are rejected at the store or import boundary instead of flowing through
//! loosely typed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status stamped on every order placed through the API, and the only status
/// counted by revenue analytics.
pub const ORDER_STATUS_COMPLETED: &str = "Completed";

/// A customer. Loaded in bulk; read-only to the query layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A catalog product. Loaded in bulk; read-only to the query layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
}

/// One line of an order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub quantity: u32,
}

/// An order.
///
/// `total` is a snapshot of `sum(price * quantity)` taken when the order was
/// placed; it is never recomputed when catalog prices move.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub items: Vec<OrderItem>,
    pub total: f64,
}
