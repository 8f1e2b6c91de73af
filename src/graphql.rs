//! GraphQL API surface.
//!
//! Endpoints:
//! - POST /graphql - Execute queries and mutations
//! - GET /graphql - GraphiQL playground
//! - GET /health - Liveness plus cache-store status
//!
//! Resolvers only translate between GraphQL types and the service layer. They
//! reach the service through the object-safe [`SalesApi`] trait, so the schema
//! type does not depend on the concrete store and cache backend.

use crate::backend::CacheBackend;
use crate::error::{Error, Result};
use crate::model::OrderItem;
use crate::report::{
    CategoryRevenue, CustomerOrder, CustomerOrdersPage, CustomerSpending, PlaceOrderInput,
    PlaceOrderItem, PlaceOrderPayload, SalesAnalytics, TopProduct,
};
use crate::service::SalesService;
use crate::store::DataStore;
use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, InputObject, Object, Result as GqlResult, Schema,
    SimpleObject, ID,
};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use futures::future::BoxFuture;
use std::sync::Arc;

// ============================================================================
// SERVICE SEAM
// ============================================================================

/// Object-safe view of [`SalesService`] used by the resolvers.
pub trait SalesApi: Send + Sync {
    fn customer_spending<'a>(
        &'a self,
        customer_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<CustomerSpending>>>;

    fn top_selling_products(&self, limit: i32) -> BoxFuture<'_, Result<Vec<TopProduct>>>;

    fn sales_analytics<'a>(
        &'a self,
        start_date: &'a str,
        end_date: &'a str,
    ) -> BoxFuture<'a, Result<SalesAnalytics>>;

    fn customer_orders<'a>(
        &'a self,
        customer_id: &'a str,
        page: i32,
        page_size: i32,
    ) -> BoxFuture<'a, Result<CustomerOrdersPage>>;

    fn place_order(&self, input: PlaceOrderInput) -> BoxFuture<'_, Result<PlaceOrderPayload>>;

    fn cache_health(&self) -> BoxFuture<'_, bool>;
}

impl<S: DataStore, B: CacheBackend> SalesApi for SalesService<S, B> {
    fn customer_spending<'a>(
        &'a self,
        customer_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<CustomerSpending>>> {
        Box::pin(SalesService::customer_spending(self, customer_id))
    }

    fn top_selling_products(&self, limit: i32) -> BoxFuture<'_, Result<Vec<TopProduct>>> {
        Box::pin(SalesService::top_selling_products(self, limit))
    }

    fn sales_analytics<'a>(
        &'a self,
        start_date: &'a str,
        end_date: &'a str,
    ) -> BoxFuture<'a, Result<SalesAnalytics>> {
        Box::pin(SalesService::sales_analytics(self, start_date, end_date))
    }

    fn customer_orders<'a>(
        &'a self,
        customer_id: &'a str,
        page: i32,
        page_size: i32,
    ) -> BoxFuture<'a, Result<CustomerOrdersPage>> {
        Box::pin(SalesService::customer_orders(self, customer_id, page, page_size))
    }

    fn place_order(&self, input: PlaceOrderInput) -> BoxFuture<'_, Result<PlaceOrderPayload>> {
        Box::pin(SalesService::place_order(self, input))
    }

    fn cache_health(&self) -> BoxFuture<'_, bool> {
        Box::pin(SalesService::cache_health(self))
    }
}

impl ErrorExtensions for Error {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        async_graphql::Error::new(self.to_string()).extend_with(|_, ext| ext.set("code", code))
    }
}

fn int(value: impl TryInto<i32>) -> i32 {
    value.try_into().unwrap_or(i32::MAX)
}

// ============================================================================
// GRAPHQL TYPES
// ============================================================================

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "CustomerSpending")]
pub struct GqlCustomerSpending {
    pub customer_id: ID,
    pub total_spent: f64,
    pub average_order_value: f64,
    pub last_order_date: Option<String>,
}

impl From<CustomerSpending> for GqlCustomerSpending {
    fn from(s: CustomerSpending) -> Self {
        Self {
            customer_id: ID(s.customer_id),
            total_spent: s.total_spent,
            average_order_value: s.average_order_value,
            last_order_date: s.last_order_date,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "TopProduct")]
pub struct GqlTopProduct {
    pub product_id: ID,
    pub name: String,
    pub total_sold: i32,
}

impl From<TopProduct> for GqlTopProduct {
    fn from(p: TopProduct) -> Self {
        Self {
            product_id: ID(p.product_id),
            name: p.name,
            total_sold: int(p.total_sold),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "CategoryBreakdown")]
pub struct GqlCategoryBreakdown {
    pub category: String,
    pub revenue: f64,
}

impl From<CategoryRevenue> for GqlCategoryBreakdown {
    fn from(c: CategoryRevenue) -> Self {
        Self {
            category: c.category,
            revenue: c.revenue,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "SalesAnalytics")]
pub struct GqlSalesAnalytics {
    pub total_revenue: f64,
    pub completed_orders: i32,
    pub category_breakdown: Vec<GqlCategoryBreakdown>,
}

impl From<SalesAnalytics> for GqlSalesAnalytics {
    fn from(a: SalesAnalytics) -> Self {
        Self {
            total_revenue: a.total_revenue,
            completed_orders: int(a.completed_orders),
            category_breakdown: a.category_breakdown.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "OrderItem")]
pub struct GqlOrderItem {
    pub product_id: ID,
    pub quantity: i32,
}

impl From<OrderItem> for GqlOrderItem {
    fn from(i: OrderItem) -> Self {
        Self {
            product_id: ID(i.product_id),
            quantity: int(i.quantity),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "CustomerOrder")]
pub struct GqlCustomerOrder {
    pub id: ID,
    pub order_date: String,
    pub status: String,
    pub items: Vec<GqlOrderItem>,
    pub total: f64,
}

impl From<CustomerOrder> for GqlCustomerOrder {
    fn from(o: CustomerOrder) -> Self {
        Self {
            id: ID(o.id),
            order_date: o.order_date,
            status: o.status,
            items: o.items.into_iter().map(Into::into).collect(),
            total: o.total,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "CustomerOrdersPage")]
pub struct GqlCustomerOrdersPage {
    pub orders: Vec<GqlCustomerOrder>,
    pub total_count: i32,
    pub page: i32,
    pub page_size: i32,
    pub total_pages: i32,
}

impl From<CustomerOrdersPage> for GqlCustomerOrdersPage {
    fn from(p: CustomerOrdersPage) -> Self {
        Self {
            orders: p.orders.into_iter().map(Into::into).collect(),
            total_count: int(p.total_count),
            page: int(p.page),
            page_size: int(p.page_size),
            total_pages: int(p.total_pages),
        }
    }
}

/// Result of `placeOrder`. `orderId` is null when the order was rejected.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "PlaceOrderPayload")]
pub struct GqlPlaceOrderPayload {
    pub order_id: Option<ID>,
    pub success: bool,
    pub message: String,
}

impl From<PlaceOrderPayload> for GqlPlaceOrderPayload {
    fn from(p: PlaceOrderPayload) -> Self {
        Self {
            order_id: p.order_id.map(ID),
            success: p.success,
            message: p.message,
        }
    }
}

// ============================================================================
// INPUT TYPES
// ============================================================================

#[derive(Debug, Clone, InputObject)]
pub struct PlaceOrderItemInput {
    pub product_id: ID,
    pub quantity: i32,
}

#[derive(Debug, Clone, InputObject)]
#[graphql(name = "PlaceOrderInput")]
pub struct GqlPlaceOrderInput {
    pub customer_id: ID,
    pub items: Vec<PlaceOrderItemInput>,
}

impl From<GqlPlaceOrderInput> for PlaceOrderInput {
    fn from(input: GqlPlaceOrderInput) -> Self {
        PlaceOrderInput {
            customer_id: input.customer_id.0,
            items: input
                .items
                .into_iter()
                .map(|item| PlaceOrderItem {
                    product_id: item.product_id.0,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

// ============================================================================
// QUERY ROOT
// ============================================================================

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Lifetime spend of a customer; null when the customer has no orders.
    async fn get_customer_spending(
        &self,
        ctx: &Context<'_>,
        customer_id: ID,
    ) -> GqlResult<Option<GqlCustomerSpending>> {
        let api = ctx.data::<Arc<dyn SalesApi>>()?;
        let spending = api
            .customer_spending(&customer_id)
            .await
            .map_err(|e| e.extend())?;
        Ok(spending.map(Into::into))
    }

    /// Best-selling products by quantity, largest first.
    ///
    /// Typed `[TopProduct!]!`: the list is empty rather than null, and
    /// products missing from the catalog are dropped rather than returned as
    /// null entries. Clients written against the nullable `[TopProduct]`
    /// shape read it unchanged.
    async fn get_top_selling_products(
        &self,
        ctx: &Context<'_>,
        limit: i32,
    ) -> GqlResult<Vec<GqlTopProduct>> {
        let api = ctx.data::<Arc<dyn SalesApi>>()?;
        let products = api
            .top_selling_products(limit)
            .await
            .map_err(|e| e.extend())?;
        Ok(products.into_iter().map(Into::into).collect())
    }

    /// Revenue of completed orders between two ISO-8601 dates, inclusive.
    async fn get_sales_analytics(
        &self,
        ctx: &Context<'_>,
        start_date: String,
        end_date: String,
    ) -> GqlResult<GqlSalesAnalytics> {
        let api = ctx.data::<Arc<dyn SalesApi>>()?;
        let analytics = api
            .sales_analytics(&start_date, &end_date)
            .await
            .map_err(|e| e.extend())?;
        Ok(analytics.into())
    }

    /// A page of a customer's orders, newest first.
    async fn get_customer_orders(
        &self,
        ctx: &Context<'_>,
        customer_id: ID,
        page: i32,
        page_size: i32,
    ) -> GqlResult<GqlCustomerOrdersPage> {
        let api = ctx.data::<Arc<dyn SalesApi>>()?;
        let orders = api
            .customer_orders(&customer_id, page, page_size)
            .await
            .map_err(|e| e.extend())?;
        Ok(orders.into())
    }
}

// ============================================================================
// MUTATION ROOT
// ============================================================================

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Place an order for an existing customer.
    async fn place_order(
        &self,
        ctx: &Context<'_>,
        input: GqlPlaceOrderInput,
    ) -> GqlResult<GqlPlaceOrderPayload> {
        let api = ctx.data::<Arc<dyn SalesApi>>()?;
        let payload = api
            .place_order(input.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(payload.into())
    }
}

// ============================================================================
// SCHEMA & HANDLERS
// ============================================================================

/// The GraphQL schema type.
pub type SalesSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Create the GraphQL schema.
pub fn create_schema(api: Arc<dyn SalesApi>) -> SalesSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(api)
        .finish()
}

/// Shared state of the HTTP routes.
#[derive(Clone)]
pub struct ApiState {
    pub schema: SalesSchema,
    pub api: Arc<dyn SalesApi>,
}

/// Handler for GraphQL requests.
pub async fn graphql_handler(State(state): State<ApiState>, req: GraphQLRequest) -> GraphQLResponse {
    state.schema.execute(req.into_inner()).await.into()
}

/// Handler for GraphiQL playground.
pub async fn graphiql_handler() -> impl IntoResponse {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

/// Liveness probe. A degraded cache is reported but does not fail the probe.
pub async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let cache = if state.api.cache_health().await {
        "up"
    } else {
        "degraded"
    };
    Json(serde_json::json!({ "status": "ok", "cache": cache }))
}

/// Create the HTTP router serving the schema.
pub fn create_router(api: Arc<dyn SalesApi>) -> Router {
    let state = ApiState {
        schema: create_schema(Arc::clone(&api)),
        api,
    };

    Router::new()
        .route("/graphql", get(graphiql_handler).post(graphql_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
