//! Customer-side order tracking for one table
//!
//! The tracker may start from a table number only. Until the table id is
//! known the poller is disabled; resolving the id swaps in the real fetch,
//! joins `table:<id>` and enables polling.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use shared::{ItemStatus, Order, OrderEvent, OrderStatus, Room};
use std::time::Duration;
use tokio::sync::watch;

use super::{TABLE_TRACKER_INTERVAL, ViewState, refetch_on};
use crate::error::ClientResult;
use crate::http::ApiClient;
use crate::poller::{PollState, Poller};
use crate::realtime::{RealtimeChannel, Subscription};

/// Progress shown to the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrackingStep {
    Received,
    Preparing,
    Served,
}

impl TrackingStep {
    pub const ALL: [TrackingStep; 3] = [
        TrackingStep::Received,
        TrackingStep::Preparing,
        TrackingStep::Served,
    ];

    /// `None` for cancelled orders, which sit outside the progression
    pub fn for_order(status: OrderStatus) -> Option<Self> {
        match status {
            OrderStatus::Pending => Some(TrackingStep::Received),
            OrderStatus::InKitchen => Some(TrackingStep::Preparing),
            OrderStatus::Served | OrderStatus::Completed | OrderStatus::Paid => {
                Some(TrackingStep::Served)
            }
            OrderStatus::Cancelled => None,
        }
    }

    pub fn for_item(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Pending => TrackingStep::Received,
            ItemStatus::Cooking | ItemStatus::Ready => TrackingStep::Preparing,
            ItemStatus::Served => TrackingStep::Served,
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrackingStep::Received => "Order Received",
            TrackingStep::Preparing => "Preparing",
            TrackingStep::Served => "Served",
        }
    }

    /// Whether this step is lit for an order at `current`
    pub fn reached_by(&self, current: TrackingStep) -> bool {
        *self <= current
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedItem {
    pub name: String,
    pub quantity: u32,
    pub status: ItemStatus,
    pub line_total: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedOrder {
    pub order_id: String,
    pub status: OrderStatus,
    pub step: Option<TrackingStep>,
    pub created_at: Option<DateTime<Utc>>,
    pub items: Vec<TrackedItem>,
    pub total: Decimal,
}

impl From<&Order> for TrackedOrder {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
            status: order.status,
            step: TrackingStep::for_order(order.status),
            created_at: order.created_at,
            items: order
                .items
                .iter()
                .map(|i| TrackedItem {
                    name: i.name().to_string(),
                    quantity: i.quantity,
                    status: i.status,
                    line_total: i.line_total(),
                })
                .collect(),
            total: order.amount_due(),
        }
    }
}

/// How the tracker finds its table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLookup {
    Id(String),
    Number(u32),
}

pub struct TableTracker {
    api: ApiClient,
    lookup: TableLookup,
    realtime: Option<RealtimeChannel>,
    table_id: RwLock<Option<String>>,
    poller: Poller<Vec<Order>>,
    subscription: Mutex<Option<Subscription>>,
}

impl TableTracker {
    /// Start tracking; with only a table number, call [`TableTracker::resolve`]
    pub fn new(api: ApiClient, realtime: Option<RealtimeChannel>, lookup: TableLookup) -> Self {
        Self::with_interval(api, realtime, lookup, TABLE_TRACKER_INTERVAL)
    }

    pub fn with_interval(
        api: ApiClient,
        realtime: Option<RealtimeChannel>,
        lookup: TableLookup,
        interval: Duration,
    ) -> Self {
        let poller = Poller::new(interval, || async { Ok(Vec::new()) });
        poller.set_enabled(false);
        poller.start();

        let tracker = Self {
            api,
            lookup: lookup.clone(),
            realtime,
            table_id: RwLock::new(None),
            poller,
            subscription: Mutex::new(None),
        };
        if let TableLookup::Id(id) = lookup {
            tracker.attach(id);
        }
        tracker
    }

    /// Resolve the table id (once) and begin polling
    pub async fn resolve(&self) -> ClientResult<String> {
        if let Some(id) = self.table_id() {
            return Ok(id);
        }
        let id = match &self.lookup {
            TableLookup::Id(id) => id.clone(),
            TableLookup::Number(number) => {
                let page = self.api.qr().by_table_number(*number).await?;
                tracing::debug!(table_number = number, table_id = %page.table.id, "Resolved table");
                page.table.id
            }
        };
        self.attach(id.clone());
        Ok(id)
    }

    fn attach(&self, id: String) {
        {
            let mut current = self.table_id.write();
            if current.is_some() {
                return;
            }
            *current = Some(id.clone());
        }

        let orders = self.api.orders();
        let fetch_id = id.clone();
        self.poller.set_fetch(move || {
            let orders = orders.clone();
            let table_id = fetch_id.clone();
            async move { orders.by_table(&table_id).await }
        });
        if let Some(channel) = &self.realtime {
            *self.subscription.lock() = Some(refetch_on(
                channel,
                [Room::table(id)],
                &OrderEvent::ALL,
                self.poller.trigger(),
            ));
        }
        self.poller.set_enabled(true);
    }

    pub fn table_id(&self) -> Option<String> {
        self.table_id.read().clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.table_id.read().is_some()
    }

    pub fn view(&self) -> ViewState<Vec<TrackedOrder>> {
        ViewState::from_poll(&self.poller.state(), |orders| {
            (!orders.is_empty()).then(|| orders.iter().map(TrackedOrder::from).collect())
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
}
