//! One order, staff side
//!
//! Every action sends a transition request and adopts the order the backend
//! returns. A rejected action leaves the displayed order as it was.

use shared::{ItemStatus, Order, OrderEvent, OrderStatus, Room};
use std::time::Duration;
use tokio::sync::watch;

use super::{ViewState, refetch_on};
use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;
use crate::poller::{PollState, Poller};
use crate::realtime::{RealtimeChannel, Subscription};

/// Fallback re-fetch while no event arrives
pub const ORDER_DETAIL_INTERVAL: Duration = Duration::from_secs(30);

const ORDER_EVENTS: [OrderEvent; 5] = [
    OrderEvent::StatusUpdated,
    OrderEvent::ItemUpdated,
    OrderEvent::Paid,
    OrderEvent::Cancelled,
    OrderEvent::ItemsAdded,
];

/// A cancellation with a reason, not yet confirmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelRequest {
    reason: String,
}

impl CancelRequest {
    pub fn new(reason: impl AsRef<str>) -> ClientResult<Self> {
        let reason = reason.as_ref().trim();
        if reason.is_empty() {
            return Err(ClientError::Validation(
                "Please provide a reason for cancellation".into(),
            ));
        }
        Ok(Self {
            reason: reason.to_string(),
        })
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The explicit second step
    pub fn confirm(self) -> ConfirmedCancel {
        ConfirmedCancel {
            reason: self.reason,
        }
    }
}

/// Only obtainable through [`CancelRequest::confirm`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedCancel {
    reason: String,
}

impl ConfirmedCancel {
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

pub struct OrderDetail {
    api: ApiClient,
    order_id: String,
    poller: Poller<Order>,
    _subscription: Option<Subscription>,
}

impl OrderDetail {
    pub fn new(api: ApiClient, realtime: Option<&RealtimeChannel>, order_id: impl Into<String>) -> Self {
        Self::with_interval(api, realtime, order_id, ORDER_DETAIL_INTERVAL)
    }

    pub fn with_interval(
        api: ApiClient,
        realtime: Option<&RealtimeChannel>,
        order_id: impl Into<String>,
        interval: Duration,
    ) -> Self {
        let order_id = order_id.into();
        let orders = api.orders();
        let fetch_id = order_id.clone();
        let poller = Poller::new(interval, move || {
            let orders = orders.clone();
            let id = fetch_id.clone();
            async move { orders.get(&id).await }
        });
        let subscription = realtime.map(|ch| {
            refetch_on(ch, [Room::order(order_id.clone())], &ORDER_EVENTS, poller.trigger())
        });
        poller.start();

        Self {
            api,
            order_id,
            poller,
            _subscription: subscription,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn order(&self) -> Option<Order> {
        self.poller.data()
    }

    pub fn view(&self) -> ViewState<Order> {
        ViewState::from_poll(&self.poller.state(), |order| Some(order.clone()))
    }

    pub fn state(&self) -> PollState<Order> {
        self.poller.state()
    }

    pub fn watch(&self) -> watch::Receiver<PollState<Order>> {
        self.poller.subscribe()
    }

    pub fn refresh(&self) {
        self.poller.refresh_now();
    }

    /// Whether a cancel action should be offered right now
    pub fn can_cancel(&self) -> bool {
        self.order().is_some_and(|o| o.status.can_cancel())
    }

    pub async fn update_status(&self, status: OrderStatus) -> ClientResult<Order> {
        let updated = self.api.orders().update_status(&self.order_id, status).await?;
        Ok(self.adopt(updated))
    }

    pub async fn update_item_status(
        &self,
        item_id: &str,
        status: ItemStatus,
        cooked_by: Option<String>,
    ) -> ClientResult<Order> {
        let updated = self
            .api
            .orders()
            .update_item_status(&self.order_id, item_id, status, cooked_by)
            .await?;
        Ok(self.adopt(updated))
    }

    pub async fn cancel(&self, confirmed: ConfirmedCancel) -> ClientResult<Order> {
        if let Some(order) = self.order()
            && !order.status.can_cancel()
        {
            return Err(ClientError::Validation(format!(
                "a {} order cannot be cancelled",
                order.status
            )));
        }
        let updated = self
            .api
            .orders()
            .cancel(&self.order_id, confirmed.reason())
            .await?;
        Ok(self.adopt(updated))
    }

    /// Show the backend's answer now; the refetch that follows outruns any
    /// older fetch still in flight
    fn adopt(&self, updated: Order) -> Order {
        self.poller.set_data(updated.clone());
        self.poller.refresh_now();
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_needs_a_reason() {
        assert!(matches!(
            CancelRequest::new("   "),
            Err(ClientError::Validation(_))
        ));
        let confirmed = CancelRequest::new("  customer left ").unwrap().confirm();
        assert_eq!(confirmed.reason(), "customer left");
    }
}
