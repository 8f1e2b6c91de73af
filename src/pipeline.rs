//! Aggregation stages composed by the query layer.
//!
//! Each function is one stage of a filter → unwind → group → join → reshape
//! pipeline. They are pure: the service feeds them rows fetched through
//! [`DataStore`](crate::store::DataStore) and gets result contracts back.

use crate::dates::to_iso;
use crate::model::{Order, OrderItem, Product};
use crate::report::{CategoryRevenue, CustomerOrder, CustomerSpending, SalesAnalytics, TopProduct};
use std::collections::{HashMap, HashSet};

/// Group a customer's orders into a lifetime spend summary.
///
/// Returns `None` when there are no orders.
pub fn summarize_spending(customer_id: &str, orders: &[Order]) -> Option<CustomerSpending> {
    let last_order = orders.iter().map(|order| order.order_date).max()?;
    let total_spent: f64 = orders.iter().map(|order| order.total).sum();

    Some(CustomerSpending {
        customer_id: customer_id.to_string(),
        total_spent,
        average_order_value: total_spent / orders.len() as f64,
        last_order_date: Some(to_iso(&last_order)),
    })
}

/// Flatten orders into their line items.
pub fn unwind_items(orders: &[Order]) -> impl Iterator<Item = (&Order, &OrderItem)> {
    orders
        .iter()
        .flat_map(|order| order.items.iter().map(move |item| (order, item)))
}

/// Sum quantities per product and keep the `limit` best sellers.
///
/// Sorted by total quantity, largest first. Tie order is unspecified.
pub fn rank_by_quantity(orders: &[Order], limit: usize) -> Vec<(String, u64)> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(String, u64)> = Vec::new();

    for (_, item) in unwind_items(orders) {
        let slot = *slots.entry(item.product_id.as_str()).or_insert_with(|| {
            totals.push((item.product_id.clone(), 0));
            totals.len() - 1
        });
        totals[slot].1 += u64::from(item.quantity);
    }

    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals.truncate(limit);
    totals
}

/// Product ids referenced by `ranked`, in rank order.
pub fn ranked_ids(ranked: &[(String, u64)]) -> Vec<String> {
    ranked.iter().map(|(id, _)| id.clone()).collect()
}

/// Join ranked products to the catalog for their names.
///
/// Ids with no catalog entry are dropped; the ranking order is preserved.
pub fn attach_names(ranked: Vec<(String, u64)>, products: &[Product]) -> Vec<TopProduct> {
    let catalog = index_products(products);

    ranked
        .into_iter()
        .filter_map(|(product_id, total_sold)| {
            catalog.get(product_id.as_str()).map(|product| TopProduct {
                name: product.name.clone(),
                product_id,
                total_sold,
            })
        })
        .collect()
}

/// Distinct product ids referenced by any line item, in first-seen order.
pub fn referenced_product_ids(orders: &[Order]) -> Vec<String> {
    let mut seen = HashSet::new();
    unwind_items(orders)
        .filter(|&(_, item)| seen.insert(item.product_id.as_str()))
        .map(|(_, item)| item.product_id.clone())
        .collect()
}

/// One priced line item.
#[derive(Clone, Debug, PartialEq)]
pub struct RevenueLine {
    pub order_id: String,
    pub category: String,
    pub revenue: f64,
}

/// Join each line item to its product and price it (`quantity × price`).
///
/// Items whose product is missing from `products` are dropped.
pub fn revenue_lines(orders: &[Order], products: &[Product]) -> Vec<RevenueLine> {
    let catalog = index_products(products);

    unwind_items(orders)
        .filter_map(|(order, item)| {
            catalog.get(item.product_id.as_str()).map(|product| RevenueLine {
                order_id: order.id.clone(),
                category: product.category.clone(),
                revenue: f64::from(item.quantity) * product.price,
            })
        })
        .collect()
}

/// Fold priced lines into totals and a per-category breakdown.
///
/// Categories appear in the order they are first met. `completed_orders`
/// counts distinct orders with at least one priced line. Returns `None` when
/// `lines` is empty.
pub fn summarize_revenue(lines: &[RevenueLine]) -> Option<SalesAnalytics> {
    if lines.is_empty() {
        return None;
    }

    let mut order_ids = HashSet::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut breakdown: Vec<CategoryRevenue> = Vec::new();
    let mut total_revenue = 0.0;

    for line in lines {
        total_revenue += line.revenue;
        order_ids.insert(line.order_id.as_str());

        let slot = *slots.entry(line.category.as_str()).or_insert_with(|| {
            breakdown.push(CategoryRevenue {
                category: line.category.clone(),
                revenue: 0.0,
            });
            breakdown.len() - 1
        });
        breakdown[slot].revenue += line.revenue;
    }

    Some(SalesAnalytics {
        total_revenue,
        completed_orders: order_ids.len() as u64,
        category_breakdown: breakdown,
    })
}

/// Snapshot total of resolved order lines: `sum(price × quantity)`.
pub fn order_total(lines: &[(Product, u32)]) -> f64 {
    lines
        .iter()
        .map(|(product, quantity)| product.price * f64::from(*quantity))
        .sum()
}

/// `(skip, limit)` for 1-indexed `page` of `page_size` rows.
pub fn page_window(page: u32, page_size: u32) -> (u64, u64) {
    let skip = u64::from(page.saturating_sub(1)) * u64::from(page_size);
    (skip, u64::from(page_size))
}

/// `ceil(total_count / page_size)`; 0 when there is nothing to page.
pub fn total_pages(total_count: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(u64::from(page_size))
}

/// Render a stored order for the order-history listing.
pub fn to_customer_order(order: Order) -> CustomerOrder {
    CustomerOrder {
        order_date: to_iso(&order.order_date),
        id: order.id,
        status: order.status,
        items: order.items,
        total: order.total,
    }
}

fn index_products(products: &[Product]) -> HashMap<&str, &Product> {
    products
        .iter()
        .map(|product| (product.id.as_str(), product))
        .collect()
}
