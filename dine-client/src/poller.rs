//! Fixed-interval re-fetch
//!
//! A [`Poller`] fetches once as soon as it starts, then again every
//! `interval` after the previous fetch settles. Fetches never overlap.
//! The latest result is published through a `watch` channel together
//! with the loading flag and the error of the last failed fetch.

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::{Mutex, RwLock};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, ClientResult};

pub type FetchFn<T> = Arc<dyn Fn() -> BoxFuture<'static, ClientResult<T>> + Send + Sync>;

/// What observers see
#[derive(Debug, Clone)]
pub struct PollState<T> {
    pub data: Option<T>,
    /// Error of the most recent fetch, cleared by the next success
    pub error: Option<Arc<ClientError>>,
    /// True until the first fetch settles
    pub is_loading: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: true,
            updated_at: None,
        }
    }
}

struct PollerInner<T> {
    fetch: RwLock<FetchFn<T>>,
    state: watch::Sender<PollState<T>>,
    interval: Duration,
    wake: Arc<Notify>,
    enabled: watch::Sender<bool>,
    running: Mutex<Option<CancellationToken>>,
}

/// Owns the polling task; dropping it stops the task
pub struct Poller<T> {
    inner: Arc<PollerInner<T>>,
}

/// Cloneable "fetch now" handle for realtime handlers
#[derive(Debug, Clone)]
pub struct RefreshTrigger {
    wake: Arc<Notify>,
    enabled: watch::Receiver<bool>,
}

impl RefreshTrigger {
    pub fn fire(&self) {
        if *self.enabled.borrow() {
            self.wake.notify_one();
        }
    }
}

fn boxed<T, F, Fut>(fetch: F) -> FetchFn<T>
where
    T: 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ClientResult<T>> + Send + 'static,
{
    Arc::new(move || fetch().boxed())
}

impl<T> Poller<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(interval: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let (state, _) = watch::channel(PollState::default());
        let (enabled, _) = watch::channel(true);
        Self {
            inner: Arc::new(PollerInner {
                fetch: RwLock::new(boxed(fetch)),
                state,
                interval,
                wake: Arc::new(Notify::new()),
                enabled,
                running: Mutex::new(None),
            }),
        }
    }

    /// Start polling; a no-op while already running
    pub fn start(&self) {
        let mut running = self.inner.running.lock();
        if running.is_some() {
            return;
        }
        let token = CancellationToken::new();
        *running = Some(token.clone());
        tokio::spawn(run(self.inner.clone(), token));
    }

    /// Stop polling; a fetch in flight is abandoned and its result dropped
    pub fn stop(&self) {
        if let Some(token) = self.inner.running.lock().take() {
            token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.lock().is_some()
    }

    /// Fetch as soon as the current fetch (if any) settles
    pub fn refresh_now(&self) {
        self.trigger().fire();
    }

    pub fn trigger(&self) -> RefreshTrigger {
        RefreshTrigger {
            wake: self.inner.wake.clone(),
            enabled: self.inner.enabled.subscribe(),
        }
    }

    /// Pause or resume; resuming fetches immediately
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.send_if_modified(|current| {
            let changed = *current != enabled;
            *current = enabled;
            changed
        });
    }

    pub fn is_enabled(&self) -> bool {
        *self.inner.enabled.borrow()
    }

    /// Replace the fetch function; the next tick uses it
    pub fn set_fetch<F, Fut>(&self, fetch: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        *self.inner.fetch.write() = boxed(fetch);
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    pub fn state(&self) -> PollState<T> {
        self.inner.state.borrow().clone()
    }

    pub fn data(&self) -> Option<T> {
        self.inner.state.borrow().data.clone()
    }

    /// Patch the published data in place, e.g. with an action's response
    ///
    /// No-op before the first successful fetch.
    pub fn update_data(&self, f: impl FnOnce(&mut T)) {
        self.inner
            .state
            .send_if_modified(|state| match state.data.as_mut() {
                Some(data) => {
                    f(data);
                    true
                }
                None => false,
            });
    }

    /// Publish `data` as the latest result, even before the first fetch
    pub fn set_data(&self, data: T) {
        self.inner.state.send_modify(|state| {
            state.data = Some(data);
            state.error = None;
            state.is_loading = false;
            state.updated_at = Some(Utc::now());
        });
    }

    /// Observe state changes (`changed().await` on the receiver)
    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.inner.state.subscribe()
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        if let Some(token) = self.inner.running.lock().take() {
            token.cancel();
        }
    }
}

async fn run<T>(inner: Arc<PollerInner<T>>, token: CancellationToken)
where
    T: Clone + Send + Sync + 'static,
{
    let mut enabled = inner.enabled.subscribe();

    loop {
        while !*enabled.borrow_and_update() {
            tokio::select! {
                _ = token.cancelled() => return,
                changed = enabled.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }

        let fetch = inner.fetch.read().clone();
        let result = tokio::select! {
            _ = token.cancelled() => return,
            result = fetch() => result,
        };
        inner.apply(result);

        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(inner.interval) => {}
            _ = inner.wake.notified() => {}
            _ = enabled.changed() => {}
        }
    }
}

impl<T> PollerInner<T> {
    fn apply(&self, result: ClientResult<T>) {
        self.state.send_modify(|state| {
            state.is_loading = false;
            match result {
                Ok(data) => {
                    state.data = Some(data);
                    state.error = None;
                    state.updated_at = Some(Utc::now());
                }
                Err(e) => {
                    tracing::warn!("Poll fetch failed: {e}");
                    state.error = Some(Arc::new(e));
                }
            }
        });
    }
}
