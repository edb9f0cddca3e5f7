//! Waiter board
//!
//! The signed-in waiter's tables and the latest pending orders, refetched
//! together so both halves always come from the same tick.

use shared::models::{DiningTable, TableStatus};
use shared::{ItemStatus, ListQuery, Order, OrderStatus};
use std::time::Duration;
use tokio::sync::watch;

use super::{ViewState, WAITER_BOARD_INTERVAL};
use crate::http::ApiClient;
use crate::poller::{PollState, Poller};

/// Raw data of one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaiterFeed {
    pub tables: Vec<DiningTable>,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaiterSnapshot {
    pub my_tables: Vec<DiningTable>,
    pub occupied: Vec<DiningTable>,
    pub available: Vec<DiningTable>,
    pub pending_orders: Vec<Order>,
    /// Served, or with at least one item waiting at the pass
    pub ready_orders: Vec<Order>,
}

impl WaiterSnapshot {
    pub fn build(feed: &WaiterFeed, waiter_id: &str) -> Self {
        let my_tables: Vec<DiningTable> = feed
            .tables
            .iter()
            .filter(|t| t.is_assigned_to(waiter_id))
            .cloned()
            .collect();
        let with_status = |status: TableStatus| -> Vec<DiningTable> {
            my_tables
                .iter()
                .filter(|t| t.status == status)
                .cloned()
                .collect()
        };

        Self {
            occupied: with_status(TableStatus::Occupied),
            available: with_status(TableStatus::Available),
            pending_orders: feed
                .orders
                .iter()
                .filter(|o| o.status == OrderStatus::Pending)
                .cloned()
                .collect(),
            ready_orders: feed
                .orders
                .iter()
                .filter(|o| {
                    o.status == OrderStatus::Served
                        || o.items.iter().any(|i| i.status == ItemStatus::Ready)
                })
                .cloned()
                .collect(),
            my_tables,
        }
    }
}

pub struct WaiterBoard {
    waiter_id: String,
    poller: Poller<WaiterFeed>,
}

impl WaiterBoard {
    pub fn new(api: ApiClient, waiter_id: impl Into<String>) -> Self {
        Self::with_interval(api, waiter_id, WAITER_BOARD_INTERVAL)
    }

    pub fn with_interval(api: ApiClient, waiter_id: impl Into<String>, interval: Duration) -> Self {
        let poller = Poller::new(interval, move || {
            let (tables, orders) = (api.tables(), api.orders());
            async move {
                let table_query = ListQuery::new().limit(100);
                let order_query = ListQuery::new()
                    .limit(20)
                    .newest_first()
                    .status(OrderStatus::Pending.as_str());
                let (tables, orders) =
                    tokio::try_join!(tables.list(&table_query), orders.list(&order_query))?;
                Ok(WaiterFeed {
                    tables: tables.items,
                    orders: orders.items,
                })
            }
        });
        poller.start();

        Self {
            waiter_id: waiter_id.into(),
            poller,
        }
    }

    pub fn view(&self) -> ViewState<WaiterSnapshot> {
        ViewState::from_poll(&self.poller.state(), |feed| {
            Some(WaiterSnapshot::build(feed, &self.waiter_id))
        })
    }

    pub fn state(&self) -> PollState<WaiterFeed> {
        self.poller.state()
    }

    pub fn watch(&self) -> watch::Receiver<PollState<WaiterFeed>> {
        self.poller.subscribe()
    }

    pub fn refresh(&self) {
        self.poller.refresh_now();
    }
}
