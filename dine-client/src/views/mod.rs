//! Order lifecycle view-models
//!
//! Each view pairs a [`Poller`] with an optional realtime subscription.
//! Realtime events never patch local state; they only pull the next fetch
//! forward. That keeps every view convergent whatever order pushes and
//! polls arrive in.

pub mod alerts;
pub mod dashboard;
pub mod kitchen;
pub mod order_detail;
pub mod payment_result;
pub mod table_tracker;
pub mod waiter;

pub use alerts::OrderAlerts;
pub use dashboard::DashboardStrip;
pub use kitchen::{KitchenQueue, KitchenSnapshot, KitchenTicket, TicketItem};
pub use order_detail::{CancelRequest, ConfirmedCancel, OrderDetail};
pub use payment_result::{PaymentOutcome, PaymentResult};
pub use table_tracker::{TableLookup, TableTracker, TrackedOrder, TrackingStep};
pub use waiter::{WaiterBoard, WaiterSnapshot};

use shared::{OrderEvent, Room};
use std::sync::Arc;
use std::time::Duration;

use crate::error::ClientError;
use crate::poller::{PollState, RefreshTrigger};
use crate::realtime::{Handlers, RealtimeChannel, Subscription};

pub const KITCHEN_QUEUE_INTERVAL: Duration = Duration::from_secs(30);
/// Kitchen staff landing view polls faster than the full queue page
pub const KITCHEN_DASHBOARD_INTERVAL: Duration = Duration::from_secs(8);
pub const TABLE_TRACKER_INTERVAL: Duration = Duration::from_secs(15);
pub const DASHBOARD_INTERVAL: Duration = Duration::from_secs(10);
pub const WAITER_BOARD_INTERVAL: Duration = Duration::from_secs(15);

/// What a view should render
#[derive(Debug, Clone)]
pub enum ViewState<T> {
    /// First fetch has not settled
    Loading,
    /// Fetched, nothing to show (or the resource does not exist)
    Empty,
    Ready(T),
    /// No data yet and the last fetch failed
    Failed(Arc<ClientError>),
}

impl<T> ViewState<T> {
    /// Project a poll state; `project` returns `None` for "nothing to show"
    ///
    /// Data, once fetched, wins over a later error so a failed refresh never
    /// blanks the screen.
    pub fn from_poll<S>(state: &PollState<S>, project: impl FnOnce(&S) -> Option<T>) -> Self {
        if let Some(data) = &state.data {
            return project(data).map_or(ViewState::Empty, ViewState::Ready);
        }
        match &state.error {
            Some(e) if e.is_not_found() => ViewState::Empty,
            Some(e) => ViewState::Failed(e.clone()),
            None if state.is_loading => ViewState::Loading,
            None => ViewState::Empty,
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}

/// Join `rooms` and turn `events` (and every reconnect) into early fetches
pub(crate) fn refetch_on(
    channel: &RealtimeChannel,
    rooms: impl IntoIterator<Item = Room>,
    events: &[OrderEvent],
    trigger: RefreshTrigger,
) -> Subscription {
    let on_event = trigger.clone();
    let subscription = channel.subscribe(
        rooms,
        Handlers::new().on_each(events, move |_| on_event.fire()),
    );
    subscription.on_reconnect(move || trigger.fire());
    subscription
}
