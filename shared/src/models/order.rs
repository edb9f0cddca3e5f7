//! Order Model
//!
//! Order and item lifecycles are owned by the backend. The client sends
//! transition requests and overwrites its copy with whatever comes back;
//! nothing here moves an order from one status to another on its own.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use validator::Validate;

use super::{Identified, Ref, string_enum};
use super::{MenuItemSummary, TableSummary, UserSummary};

/// Order-level status
///
/// `Pending → InKitchen → Served → {Paid | Completed}`, with `Cancelled`
/// reachable from any non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    InKitchen,
    Served,
    Cancelled,
    Paid,
    Completed,
}

string_enum!(OrderStatus, "order", {
    Pending => "Pending",
    InKitchen => "InKitchen",
    Served => "Served",
    Cancelled => "Cancelled",
    Paid => "Paid",
    Completed => "Completed",
});

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Cancelled | OrderStatus::Paid | OrderStatus::Completed
        )
    }

    /// Cancellation is offered only while the order is still live
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }
}

/// Item-level cook status: `Pending → Cooking → Ready → Served`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ItemStatus {
    #[default]
    Pending,
    Cooking,
    Ready,
    Served,
}

string_enum!(ItemStatus, "item", {
    Pending => "Pending",
    Cooking => "Cooking",
    Ready => "Ready",
    Served => "Served",
});

impl ItemStatus {
    /// The status a staff action would request next
    pub fn next(&self) -> Option<ItemStatus> {
        match self {
            ItemStatus::Pending => Some(ItemStatus::Cooking),
            ItemStatus::Cooking => Some(ItemStatus::Ready),
            ItemStatus::Ready => Some(ItemStatus::Served),
            ItemStatus::Served => None,
        }
    }

    /// Ready or already served
    pub fn is_done_cooking(&self) -> bool {
        matches!(self, ItemStatus::Ready | ItemStatus::Served)
    }
}

/// One line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub menu_item: Ref<MenuItemSummary>,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: ItemStatus,
    /// Line total as computed by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,
}

impl OrderItem {
    pub fn name(&self) -> &str {
        self.menu_item
            .populated()
            .map(|m| m.name.as_str())
            .unwrap_or("Item")
    }

    /// Server subtotal when present, otherwise price × quantity
    pub fn line_total(&self) -> Option<Decimal> {
        self.subtotal.or_else(|| {
            self.menu_item
                .populated()
                .map(|m| m.price * Decimal::from(self.quantity))
        })
    }
}

impl Identified for OrderItem {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Ref<TableSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_waiter: Option<Ref<UserSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Any item still waiting for the kitchen
    pub fn has_pending_item(&self) -> bool {
        self.items.iter().any(|i| i.status == ItemStatus::Pending)
    }

    /// Every item is Ready or Served (vacuously true for an empty order)
    pub fn all_ready(&self) -> bool {
        self.items.iter().all(|i| i.status.is_done_cooking())
    }

    /// Any item not yet served
    pub fn has_open_item(&self) -> bool {
        self.items.iter().any(|i| i.status != ItemStatus::Served)
    }

    pub fn item_counts(&self) -> ItemCounts {
        let mut counts = ItemCounts::default();
        for item in &self.items {
            counts.record(item);
        }
        counts
    }

    pub fn item(&self, item_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn table_id(&self) -> Option<&str> {
        self.table.as_ref().map(|t| t.id())
    }

    pub fn table_number(&self) -> Option<u32> {
        self.table
            .as_ref()
            .and_then(|t| t.populated())
            .map(|t| t.table_number)
    }

    /// The amount a payment should cover
    pub fn amount_due(&self) -> Decimal {
        self.final_amount
            .filter(|a| !a.is_zero())
            .unwrap_or(self.total_amount)
    }

    /// Last six characters of the id, as shown to staff
    pub fn short_id(&self) -> &str {
        let start = self
            .id
            .char_indices()
            .rev()
            .nth(5)
            .map(|(i, _)| i)
            .unwrap_or(0);
        &self.id[start..]
    }
}

impl Identified for Order {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Per-status item line counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ItemCounts {
    pub pending: usize,
    pub cooking: usize,
    pub ready: usize,
    pub served: usize,
    /// Sum of quantities over pending lines
    pub pending_units: u32,
}

impl ItemCounts {
    fn record(&mut self, item: &OrderItem) {
        match item.status {
            ItemStatus::Pending => {
                self.pending += 1;
                self.pending_units = self.pending_units.saturating_add(item.quantity);
            }
            ItemStatus::Cooking => self.cooking += 1,
            ItemStatus::Ready => self.ready += 1,
            ItemStatus::Served => self.served += 1,
        }
    }

    /// Counts across a whole order list, computed fresh each call
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        orders
            .into_iter()
            .fold(ItemCounts::default(), |mut acc, o| {
                acc += o.item_counts();
                acc
            })
    }

    pub fn total(&self) -> usize {
        self.pending + self.cooking + self.ready + self.served
    }
}

impl AddAssign for ItemCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.pending += rhs.pending;
        self.cooking += rhs.cooking;
        self.ready += rhs.ready;
        self.served += rhs.served;
        self.pending_units += rhs.pending_units;
    }
}

// =============================================================================
// Request payloads
// =============================================================================

/// `PATCH /orders/:id/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// `PATCH /orders/:orderId/items/:itemId/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStatusUpdate {
    pub status: ItemStatus,
    /// Staff member who cooked the item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooked_by: Option<String>,
}

/// `PATCH /orders/:id/cancel`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CancelOrder {
    #[validate(length(min = 1, message = "a cancellation reason is required"))]
    pub reason: String,
}

/// One line of a new order or of an add-items request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    /// Menu item id
    pub menu_item: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// `POST /orders/public`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PublicOrderCreate {
    #[validate(length(min = 1))]
    pub table_id: String,
    #[validate(length(min = 1, message = "customer name is required"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "an order needs at least one item"), nested)]
    pub items: Vec<NewOrderItem>,
}

/// `POST /orders/:id/items`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddOrderItems {
    #[validate(length(min = 1), nested)]
    pub items: Vec<NewOrderItem>,
}
