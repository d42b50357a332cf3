//! Restaurant API collaborators
//!
//! Each remote service is a trait so views and the cart store can be driven
//! by in-memory fakes in tests. [`RestApi`] implements all of them over HTTP.

use async_trait::async_trait;
use shared::{
    CreateOrderResponse, ItemStatus, ItemStatusUpdate, MenuItem, Order, OrderCreate, OrderStatus,
    OrderStatusUpdate, TableAvailability,
};
use tracing::instrument;

use crate::ClientResult;
use crate::http::{HttpClient, NetworkHttpClient};

/// Read-only menu catalog
#[async_trait]
pub trait MenuService: Send + Sync {
    async fn menu_items(&self) -> ClientResult<Vec<MenuItem>>;
    async fn menu_item(&self, id: i64) -> ClientResult<MenuItem>;
}

/// Order creation, lookup and kitchen status transitions
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn create_order(&self, order: &OrderCreate) -> ClientResult<Order>;
    async fn order(&self, id: i64) -> ClientResult<Order>;
    async fn update_order_status(&self, id: i64, status: OrderStatus) -> ClientResult<()>;
    async fn kitchen_orders(&self) -> ClientResult<Vec<Order>>;
    async fn update_item_status(
        &self,
        order_id: i64,
        item_id: i64,
        status: ItemStatus,
    ) -> ClientResult<()>;
}

/// Table occupancy lookup
#[async_trait]
pub trait TableService: Send + Sync {
    async fn immediate_availability(&self, table_id: i64) -> ClientResult<TableAvailability>;
}

/// REST implementation of every service
#[derive(Debug, Clone)]
pub struct RestApi<H = NetworkHttpClient> {
    http: H,
}

impl<H: HttpClient> RestApi<H> {
    pub fn new(http: H) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &H {
        &self.http
    }
}

#[async_trait]
impl<H: HttpClient> MenuService for RestApi<H> {
    #[instrument(skip(self))]
    async fn menu_items(&self) -> ClientResult<Vec<MenuItem>> {
        self.http.get("menu-items").await
    }

    #[instrument(skip(self))]
    async fn menu_item(&self, id: i64) -> ClientResult<MenuItem> {
        self.http.get(&format!("menu-items/{id}")).await
    }
}

#[async_trait]
impl<H: HttpClient> OrderService for RestApi<H> {
    #[instrument(skip(self, order), fields(table_id = order.table_id, lines = order.order_items.len()))]
    async fn create_order(&self, order: &OrderCreate) -> ClientResult<Order> {
        let resp: CreateOrderResponse = self.http.post("orders", order).await?;
        Ok(resp.order)
    }

    #[instrument(skip(self))]
    async fn order(&self, id: i64) -> ClientResult<Order> {
        self.http.get(&format!("orders/{id}")).await
    }

    #[instrument(skip(self))]
    async fn update_order_status(&self, id: i64, status: OrderStatus) -> ClientResult<()> {
        let _: serde_json::Value = self
            .http
            .patch(&format!("orders/{id}/status"), &OrderStatusUpdate { status })
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn kitchen_orders(&self) -> ClientResult<Vec<Order>> {
        self.http.get("orders/kitchen/display").await
    }

    #[instrument(skip(self))]
    async fn update_item_status(
        &self,
        order_id: i64,
        item_id: i64,
        status: ItemStatus,
    ) -> ClientResult<()> {
        let _: serde_json::Value = self
            .http
            .patch(
                &format!("orders/{order_id}/items/{item_id}/status"),
                &ItemStatusUpdate {
                    item_status: status,
                },
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<H: HttpClient> TableService for RestApi<H> {
    #[instrument(skip(self))]
    async fn immediate_availability(&self, table_id: i64) -> ClientResult<TableAvailability> {
        self.http
            .get(&format!("tables/availability/{table_id}/immediate"))
            .await
    }
}
