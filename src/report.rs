//! Output contracts of the query layer and the order-placement input/output.
//!
//! These are the shapes the API surface renders. The three cacheable ones
//! (`CustomerSpending`, `Vec<TopProduct>`, `SalesAnalytics`) implement
//! [`CachedPayload`](crate::entity::CachedPayload).

use crate::model::OrderItem;
use serde::{Deserialize, Serialize};

/// Lifetime spend of one customer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerSpending {
    pub customer_id: String,
    pub total_spent: f64,
    pub average_order_value: f64,
    /// ISO-8601 date of the most recent order.
    pub last_order_date: Option<String>,
}

/// One entry of the best-seller ranking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    pub product_id: String,
    pub name: String,
    pub total_sold: u64,
}

/// Revenue attributed to one category label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: f64,
}

/// Revenue summary of completed orders inside a date window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesAnalytics {
    pub total_revenue: f64,
    pub completed_orders: u64,
    /// Ordered by first appearance of each category in the scanned orders.
    pub category_breakdown: Vec<CategoryRevenue>,
}

impl SalesAnalytics {
    /// Result for a window without any completed, priceable order.
    pub fn empty() -> Self {
        SalesAnalytics {
            total_revenue: 0.0,
            completed_orders: 0,
            category_breakdown: Vec::new(),
        }
    }
}

/// An order as listed in a customer's order history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrder {
    pub id: String,
    /// ISO-8601
    pub order_date: String,
    pub status: String,
    pub items: Vec<OrderItem>,
    pub total: f64,
}

/// One page of a customer's orders, newest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrdersPage {
    pub orders: Vec<CustomerOrder>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

/// A requested order line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrderItem {
    pub product_id: String,
    pub quantity: i32,
}

/// A requested order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrderInput {
    pub customer_id: String,
    pub items: Vec<PlaceOrderItem>,
}

/// Outcome of an order placement.
///
/// Unknown customers and products are reported here with `success: false`
/// rather than as errors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrderPayload {
    pub order_id: Option<String>,
    pub success: bool,
    pub message: String,
}

impl PlaceOrderPayload {
    pub fn placed(order_id: String) -> Self {
        PlaceOrderPayload {
            order_id: Some(order_id),
            success: true,
            message: "Order placed successfully".to_string(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        PlaceOrderPayload {
            order_id: None,
            success: false,
            message: message.into(),
        }
    }
}
