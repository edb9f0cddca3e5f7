//! Live operations strip

use shared::models::RealTimeStats;
use shared::{OrderEvent, Room};
use std::time::Duration;
use tokio::sync::watch;

use super::{DASHBOARD_INTERVAL, ViewState, refetch_on};
use crate::http::ApiClient;
use crate::poller::{PollState, Poller};
use crate::realtime::{RealtimeChannel, Subscription};

pub struct DashboardStrip {
    poller: Poller<RealTimeStats>,
    _subscription: Option<Subscription>,
}

impl DashboardStrip {
    pub fn new(api: ApiClient, realtime: Option<&RealtimeChannel>) -> Self {
        Self::with_interval(api, realtime, DASHBOARD_INTERVAL)
    }

    pub fn with_interval(
        api: ApiClient,
        realtime: Option<&RealtimeChannel>,
        interval: Duration,
    ) -> Self {
        let dashboard = api.dashboard();
        let poller = Poller::new(interval, move || {
            let dashboard = dashboard.clone();
            async move { dashboard.real_time().await }
        });
        let subscription =
            realtime.map(|ch| refetch_on(ch, [Room::Dashboard], &OrderEvent::ALL, poller.trigger()));
        poller.start();

        Self {
            poller,
            _subscription: subscription,
        }
    }

    pub fn view(&self) -> ViewState<RealTimeStats> {
        ViewState::from_poll(&self.poller.state(), |stats| Some(stats.clone()))
    }

    pub fn state(&self) -> PollState<RealTimeStats> {
        self.poller.state()
    }

    pub fn watch(&self) -> watch::Receiver<PollState<RealTimeStats>> {
        self.poller.subscribe()
    }

    pub fn refresh(&self) {
        self.poller.refresh_now();
    }
}
