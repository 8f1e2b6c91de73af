//! # sales-analytics
//!
//! Cache-aside analytics over a sales data store, served as a GraphQL API.
//!
//! ## Features
//!
//! - **Cache-aside queries:** customer spending, top-selling products and
//!   revenue-by-category are memoized with a fixed TTL
//! - **Degrade to source:** a slow, empty or unreachable cache store only costs
//!   latency, never correctness
//! - **Swappable stores:** [`DataStore`] and [`CacheBackend`] are traits; the
//!   in-memory implementations back tests, Postgres and Redis back production
//! - **GraphQL surface:** `async-graphql` schema served through `axum`
//!
//! ## Quick Start
//!
//! ```ignore
//! use sales_analytics::{
//!     SalesService,
//!     backend::InMemoryBackend,
//!     graphql::create_router,
//!     store::InMemoryStore,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! // 1. Inject the stores
//! let service = SalesService::new(
//!     InMemoryStore::new(),
//!     InMemoryBackend::new(),
//!     Duration::from_secs(300),
//! );
//!
//! // 2. Query directly
//! let top = service.top_selling_products(5).await?;
//!
//! // 3. Or serve it
//! let app = create_router(Arc::new(service));
//! ```

#[macro_use]
extern crate log;

pub mod backend;
pub mod config;
pub mod dates;
pub mod entity;
pub mod error;
pub mod expander;
pub mod graphql;
pub mod import;
pub mod key;
pub mod model;
pub mod observability;
pub mod pipeline;
pub mod report;
pub mod serialization;
pub mod service;
pub mod store;

// Re-exports for convenience
pub use backend::CacheBackend;
pub use config::AppConfig;
pub use entity::CachedPayload;
pub use error::{Error, Result};
pub use expander::{CacheExpander, DEFAULT_CACHE_TTL};
pub use graphql::{create_router, create_schema, SalesApi, SalesSchema};
pub use service::SalesService;
pub use store::DataStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
