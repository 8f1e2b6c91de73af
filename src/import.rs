//! Bulk loader: replace every collection with the contents of CSV exports.
//!
//! Expects `customers.csv`, `orders.csv` and `products.csv` under one
//! directory. Id columns may be headed `_id` or `id`. The `items` column of
//! `orders.csv` holds a JSON array of `{"productId": .., "quantity": ..}`.
//!
//! Administrative only; request handling never goes through this module.

use crate::dates::parse_timestamp;
use crate::error::{Error, Result};
use crate::model::{Customer, Order, OrderItem, Product};
use crate::store::DataStore;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

pub const CUSTOMERS_FILE: &str = "customers.csv";
pub const ORDERS_FILE: &str = "orders.csv";
pub const PRODUCTS_FILE: &str = "products.csv";

/// Record counts loaded per collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub customers: usize,
    pub orders: usize,
    pub products: usize,
}

#[derive(Deserialize)]
struct CustomerRow {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    name: String,
    email: String,
}

#[derive(Deserialize)]
struct ProductRow {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    name: String,
    category: String,
    price: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderRow {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    customer_id: String,
    order_date: String,
    status: String,
    items: String,
    #[serde(default)]
    total: f64,
}

impl TryFrom<OrderRow> for Order {
    type Error = Error;

    fn try_from(row: OrderRow) -> Result<Self> {
        let order_date = parse_timestamp(&row.order_date)
            .map_err(|e| Error::Import(format!("order {}: {}", row.id, e)))?;
        let items = parse_items(&row.items)
            .map_err(|e| Error::Import(format!("order {}: invalid items column: {}", row.id, e)))?;

        Ok(Order {
            id: row.id,
            customer_id: row.customer_id,
            order_date,
            status: row.status,
            items,
            total: row.total,
        })
    }
}

/// Parse the `items` column. Python-style single-quoted exports are accepted.
fn parse_items(raw: &str) -> serde_json::Result<Vec<OrderItem>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(raw)
        .or_else(|_| serde_json::from_str(&raw.replace('\'', "\"")))
}

pub fn read_customers<R: Read>(reader: R) -> Result<Vec<Customer>> {
    csv::Reader::from_reader(reader)
        .deserialize::<CustomerRow>()
        .map(|row| -> Result<Customer> {
            let row = row?;
            Ok(Customer {
                id: row.id,
                name: row.name,
                email: row.email,
            })
        })
        .collect()
}

pub fn read_products<R: Read>(reader: R) -> Result<Vec<Product>> {
    csv::Reader::from_reader(reader)
        .deserialize::<ProductRow>()
        .map(|row| -> Result<Product> {
            let row = row?;
            if row.price < 0.0 {
                return Err(Error::Import(format!("product {} has a negative price", row.id)));
            }
            Ok(Product {
                id: row.id,
                name: row.name,
                category: row.category,
                price: row.price,
            })
        })
        .collect()
}

pub fn read_orders<R: Read>(reader: R) -> Result<Vec<Order>> {
    csv::Reader::from_reader(reader)
        .deserialize::<OrderRow>()
        .map(|row| -> Result<Order> { Order::try_from(row?) })
        .collect()
}

/// Wipe and reload customers, orders and products from `dir`.
///
/// Every file is parsed before anything is written, so a malformed export
/// leaves the store untouched.
pub async fn import_all<S: DataStore>(store: &S, dir: &Path) -> Result<ImportSummary> {
    let customers = read_customers(open(dir, CUSTOMERS_FILE)?)?;
    let orders = read_orders(open(dir, ORDERS_FILE)?)?;
    let products = read_products(open(dir, PRODUCTS_FILE)?)?;

    let summary = ImportSummary {
        customers: store.replace_customers(customers).await?,
        orders: store.replace_orders(orders).await?,
        products: store.replace_products(products).await?,
    };

    info!("Imported {} records from {}", summary.customers, dir.join(CUSTOMERS_FILE).display());
    info!("Imported {} records from {}", summary.orders, dir.join(ORDERS_FILE).display());
    info!("Imported {} records from {}", summary.products, dir.join(PRODUCTS_FILE).display());

    Ok(summary)
}

fn open(dir: &Path, file: &str) -> Result<std::fs::File> {
    let path = dir.join(file);
    std::fs::File::open(&path)
        .map_err(|e| Error::Io(format!("cannot open {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use chrono::{TimeZone, Utc};

    const CUSTOMERS: &str = "_id,name,email\nC1,Ada,ada@example.com\nC2,Linus,linus@example.com\n";
    const PRODUCTS: &str = "_id,name,category,price\nP1,Desk Lamp,Home,24.5\nP2,Novel,Books,12\n";
    const ORDERS: &str = "_id,customerId,orderDate,status,items,total\n\
        O1,C1,2024-01-05T10:00:00Z,Completed,\"[{\"\"productId\"\":\"\"P1\"\",\"\"quantity\"\":2}]\",49\n\
        O2,C2,2024-01-06,Pending,\"[{'productId': 'P2', 'quantity': 1}]\",12\n";

    #[test]
    fn test_read_customers() {
        let customers = read_customers(CUSTOMERS.as_bytes()).unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[1].email, "linus@example.com");
    }

    #[test]
    fn test_read_customers_accepts_plain_id_header() {
        let customers = read_customers("id,name,email\nC9,Grace,g@example.com\n".as_bytes()).unwrap();
        assert_eq!(customers[0].id, "C9");
    }

    #[test]
    fn test_read_orders_parses_items_and_dates() {
        let orders = read_orders(ORDERS.as_bytes()).unwrap();
        assert_eq!(orders.len(), 2);

        assert_eq!(
            orders[0].order_date,
            Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap()
        );
        assert_eq!(orders[0].items[0].product_id, "P1");
        assert_eq!(orders[0].items[0].quantity, 2);
        assert_eq!(orders[0].total, 49.0);

        // Single-quoted items column
        assert_eq!(orders[1].items[0].product_id, "P2");
        assert_eq!(orders[1].status, "Pending");
    }

    #[test]
    fn test_read_orders_rejects_bad_date() {
        let csv = "_id,customerId,orderDate,status,items,total\nO1,C1,someday,Completed,[],0\n";
        assert!(matches!(read_orders(csv.as_bytes()), Err(Error::Import(_))));
    }

    #[test]
    fn test_read_products_rejects_negative_price() {
        let csv = "_id,name,category,price\nP1,Refund,Misc,-3\n";
        assert!(matches!(read_products(csv.as_bytes()), Err(Error::Import(_))));
    }

    #[tokio::test]
    async fn test_import_all_replaces_collections() {
        let dir = std::env::temp_dir().join(format!("sales-import-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CUSTOMERS_FILE), CUSTOMERS).unwrap();
        std::fs::write(dir.join(PRODUCTS_FILE), PRODUCTS).unwrap();
        std::fs::write(dir.join(ORDERS_FILE), ORDERS).unwrap();

        let store = InMemoryStore::new();
        store.insert_customer(Customer {
            id: "STALE".to_string(),
            name: "Old".to_string(),
            email: "old@example.com".to_string(),
        });

        let summary = import_all(&store, &dir).await.unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                customers: 2,
                orders: 2,
                products: 2,
            }
        );
        assert!(store.find_customer("STALE").await.unwrap().is_none());
        assert_eq!(store.order_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_import_all_missing_file() {
        let dir = std::env::temp_dir().join(format!("sales-import-{}", uuid::Uuid::new_v4()));
        let err = import_all(&InMemoryStore::new(), &dir).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
