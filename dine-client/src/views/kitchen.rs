//! Kitchen queue
//!
//! Orders the kitchen still has work on, grouped as tickets with the next
//! action for each item. Counts are recomputed from the fetched list every
//! time a snapshot is taken.

use chrono::{DateTime, Utc};
use shared::models::ItemCounts;
use shared::{ItemStatus, Order, OrderEvent, OrderStatus, Room};
use std::time::Duration;
use tokio::sync::watch;

use super::{KITCHEN_QUEUE_INTERVAL, ViewState, refetch_on};
use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;
use crate::poller::{PollState, Poller};
use crate::realtime::{RealtimeChannel, Subscription};

const KITCHEN_EVENTS: [OrderEvent; 5] = [
    OrderEvent::New,
    OrderEvent::StatusUpdated,
    OrderEvent::ItemUpdated,
    OrderEvent::Cancelled,
    OrderEvent::ItemsAdded,
];

/// Action the kitchen offers for an item in this status
pub fn kitchen_action(status: ItemStatus) -> Option<ItemStatus> {
    match status {
        ItemStatus::Pending | ItemStatus::Cooking => status.next(),
        ItemStatus::Ready | ItemStatus::Served => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketItem {
    pub item_id: String,
    pub name: String,
    pub quantity: u32,
    pub notes: Option<String>,
    pub status: ItemStatus,
    pub action: Option<ItemStatus>,
}

/// One order as the kitchen sees it
#[derive(Debug, Clone, PartialEq)]
pub struct KitchenTicket {
    pub order_id: String,
    pub short_id: String,
    pub table_number: Option<u32>,
    pub customer_name: Option<String>,
    /// Backend status, shown as-is even when items have moved on
    pub status: OrderStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub has_pending_item: bool,
    pub all_ready: bool,
    pub items: Vec<TicketItem>,
}

impl KitchenTicket {
    fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
            short_id: order.short_id().to_string(),
            table_number: order.table_number(),
            customer_name: order.customer_name.clone(),
            status: order.status,
            created_at: order.created_at,
            has_pending_item: order.has_pending_item(),
            all_ready: order.all_ready(),
            items: order
                .items
                .iter()
                .map(|i| TicketItem {
                    item_id: i.id.clone(),
                    name: i.name().to_string(),
                    quantity: i.quantity,
                    notes: i.notes.clone(),
                    status: i.status,
                    action: kitchen_action(i.status),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KitchenSnapshot {
    pub tickets: Vec<KitchenTicket>,
    pub counts: ItemCounts,
}

impl KitchenSnapshot {
    /// Tickets for orders with an unserved item; counts over everything fetched
    pub fn from_orders(orders: &[Order]) -> Self {
        Self {
            tickets: orders
                .iter()
                .filter(|o| o.has_open_item())
                .map(KitchenTicket::from_order)
                .collect(),
            counts: ItemCounts::from_orders(orders),
        }
    }

    pub fn ticket(&self, order_id: &str) -> Option<&KitchenTicket> {
        self.tickets.iter().find(|t| t.order_id == order_id)
    }
}

/// Live kitchen queue; polling stops when dropped
pub struct KitchenQueue {
    api: ApiClient,
    poller: Poller<Vec<Order>>,
    _subscription: Option<Subscription>,
}

impl KitchenQueue {
    pub fn new(api: ApiClient, realtime: Option<&RealtimeChannel>) -> Self {
        Self::with_interval(api, realtime, KITCHEN_QUEUE_INTERVAL)
    }

    pub fn with_interval(
        api: ApiClient,
        realtime: Option<&RealtimeChannel>,
        interval: Duration,
    ) -> Self {
        let orders = api.orders();
        let poller = Poller::new(interval, move || {
            let orders = orders.clone();
            async move { orders.kitchen_queue().await }
        });
        let subscription =
            realtime.map(|ch| refetch_on(ch, [Room::Kitchen], &KITCHEN_EVENTS, poller.trigger()));
        poller.start();

        Self {
            api,
            poller,
            _subscription: subscription,
        }
    }

    pub fn view(&self) -> ViewState<KitchenSnapshot> {
        ViewState::from_poll(&self.poller.state(), |orders| {
            let snapshot = KitchenSnapshot::from_orders(orders);
            (!snapshot.tickets.is_empty()).then_some(snapshot)
        })
    }

    pub fn state(&self) -> PollState<Vec<Order>> {
        self.poller.state()
    }

    pub fn watch(&self) -> watch::Receiver<PollState<Vec<Order>>> {
        self.poller.subscribe()
    }

    pub fn refresh(&self) {
        self.poller.refresh_now();
    }

    pub fn poller(&self) -> &Poller<Vec<Order>> {
        &self.poller
    }

    /// Request the item's next kitchen step (Pending→Cooking, Cooking→Ready)
    pub async fn advance_item(
        &self,
        order_id: &str,
        item_id: &str,
        cooked_by: Option<String>,
    ) -> ClientResult<Order> {
        let current = self
            .poller
            .data()
            .and_then(|orders| {
                orders
                    .iter()
                    .find(|o| o.id == order_id)
                    .and_then(|o| o.item(item_id))
                    .map(|i| i.status)
            })
            .ok_or_else(|| ClientError::NotFound(format!("item {item_id} in order {order_id}")))?;
        let next = kitchen_action(current).ok_or_else(|| {
            ClientError::Validation(format!("item is {current}; nothing for the kitchen to do"))
        })?;
        self.set_item_status(order_id, item_id, next, cooked_by).await
    }

    /// Send an item status request, adopt the returned order, then refetch
    pub async fn set_item_status(
        &self,
        order_id: &str,
        item_id: &str,
        status: ItemStatus,
        cooked_by: Option<String>,
    ) -> ClientResult<Order> {
        let updated = self
            .api
            .orders()
            .update_item_status(order_id, item_id, status, cooked_by)
            .await?;

        let replacement = updated.clone();
        self.poller.update_data(move |orders| {
            if let Some(slot) = orders.iter_mut().find(|o| o.id == replacement.id) {
                *slot = replacement;
            }
        });
        self.poller.refresh_now();
        Ok(updated)
    }
}
