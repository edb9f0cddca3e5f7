//! `/orders` endpoints
//!
//! Status-changing calls return the updated order, which callers use to
//! overwrite their local copy. Nothing here infers a transition.

use shared::models::{
    AddOrderItems, CancelOrder, ItemStatus, ItemStatusUpdate, OrderStatus, OrderStatusUpdate,
    PublicOrderCreate,
};
use shared::{ListQuery, Order, Page};
use validator::Validate;

use super::resource;
use crate::error::ClientResult;

resource!(OrdersApi);

impl OrdersApi {
    pub async fn list(&self, query: &ListQuery) -> ClientResult<Page<Order>> {
        self.client.get_page("/orders", query).await
    }

    pub async fn get(&self, order_id: &str) -> ClientResult<Order> {
        self.client.get(&format!("/orders/{order_id}")).await
    }

    /// Orders the kitchen still has work on
    pub async fn kitchen_queue(&self) -> ClientResult<Vec<Order>> {
        self.client.get("/orders/kitchen/queue").await
    }

    pub async fn update_status(&self, order_id: &str, status: OrderStatus) -> ClientResult<Order> {
        tracing::debug!(order_id, %status, "Updating order status");
        self.client
            .patch(
                &format!("/orders/{order_id}/status"),
                &OrderStatusUpdate { status },
            )
            .await
    }

    pub async fn update_item_status(
        &self,
        order_id: &str,
        item_id: &str,
        status: ItemStatus,
        cooked_by: Option<String>,
    ) -> ClientResult<Order> {
        tracing::debug!(order_id, item_id, %status, "Updating item status");
        self.client
            .patch(
                &format!("/orders/{order_id}/items/{item_id}/status"),
                &ItemStatusUpdate { status, cooked_by },
            )
            .await
    }

    /// Cancel with a reason; the confirmation step lives in the order detail view
    pub async fn cancel(&self, order_id: &str, reason: &str) -> ClientResult<Order> {
        let body = CancelOrder {
            reason: reason.trim().to_string(),
        };
        body.validate()?;
        tracing::info!(order_id, "Cancelling order");
        self.client
            .patch(&format!("/orders/{order_id}/cancel"), &body)
            .await
    }

    pub async fn add_items(&self, order_id: &str, items: &AddOrderItems) -> ClientResult<Order> {
        items.validate()?;
        self.client
            .post(&format!("/orders/{order_id}/items"), items)
            .await
    }

    /// Customer order from the QR menu; no session needed
    pub async fn create_public(&self, order: &PublicOrderCreate) -> ClientResult<Order> {
        order.validate()?;
        self.client.post("/orders/public", order).await
    }

    /// A table's orders as the customer sees them
    pub async fn by_table(&self, table_id: &str) -> ClientResult<Vec<Order>> {
        self.client
            .get(&format!("/orders/public/table/{table_id}"))
            .await
    }
}
