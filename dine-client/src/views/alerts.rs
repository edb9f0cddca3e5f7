//! New-order alerts for staff
//!
//! Lives in its own `admin-alerts` room so leaving the dashboard view does
//! not silence it.

use shared::{OrderEvent, OrderNotice, Room};
use tokio::sync::mpsc;

use crate::realtime::{Handlers, RealtimeChannel, Subscription};

/// What a toast shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAlert {
    pub order_id: Option<String>,
    pub table: String,
    pub customer: String,
    pub item_count: u32,
}

impl OrderAlert {
    pub fn from_notice(notice: &OrderNotice) -> Self {
        Self {
            order_id: notice.order_id().map(str::to_string),
            table: notice.table_label(),
            customer: notice.customer().to_string(),
            item_count: notice.item_count(),
        }
    }

    /// Where "view" leads: the order when known, else the order list
    pub fn target_path(&self) -> String {
        match &self.order_id {
            Some(id) => format!("/orders/{id}"),
            None => "/orders".to_string(),
        }
    }
}

pub struct OrderAlerts {
    alerts: mpsc::UnboundedReceiver<OrderAlert>,
    _subscription: Subscription,
}

impl OrderAlerts {
    pub fn new(channel: &RealtimeChannel) -> Self {
        let (tx, alerts) = mpsc::unbounded_channel();
        let subscription = channel.subscribe(
            [Room::AdminAlerts],
            Handlers::new().on(OrderEvent::New, move |payload| {
                let alert = OrderAlert::from_notice(&OrderNotice::from_value(payload));
                tracing::info!(table = %alert.table, items = alert.item_count, "New order");
                let _ = tx.send(alert);
            }),
        );
        Self {
            alerts,
            _subscription: subscription,
        }
    }

    /// Next alert; `None` once the channel is gone
    pub async fn next(&mut self) -> Option<OrderAlert> {
        self.alerts.recv().await
    }

    pub fn try_next(&mut self) -> Option<OrderAlert> {
        self.alerts.try_recv().ok()
    }
}
