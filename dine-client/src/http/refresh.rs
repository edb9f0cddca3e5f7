//! Single-flight session refresh
//!
//! However many requests hit a 401 at once, one refresh runs. Everyone who
//! arrives while it is in flight waits on the same outcome. A request whose
//! 401 shows up after a refresh already finished (one that started after the
//! request was sent) reuses that outcome instead of starting another.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Why a refresh failed; cloned out to every waiter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl RefreshFailure {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({status})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

pub type RefreshOutcome = Result<(), RefreshFailure>;

#[derive(Debug, Default)]
struct FlightState {
    /// Bumped each time a refresh settles
    generation: u64,
    last: Option<RefreshOutcome>,
    in_flight: Option<broadcast::Sender<RefreshOutcome>>,
}

#[derive(Debug, Default)]
pub struct SingleFlight {
    state: Mutex<FlightState>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture before sending a request; pass to [`SingleFlight::run`] on 401
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.lock().in_flight.is_some()
    }

    /// Join the current refresh, reuse a newer settled one, or start one
    ///
    /// The refresh future runs on its own task so a caller that gives up
    /// waiting does not strand the others.
    pub async fn run<F, Fut>(self: &Arc<Self>, seen_generation: u64, refresh: F) -> RefreshOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RefreshOutcome> + Send + 'static,
    {
        let mut rx = {
            let mut state = self.state.lock();
            if state.generation != seen_generation
                && let Some(last) = &state.last
            {
                tracing::debug!(
                    generation = state.generation,
                    "Reusing outcome of a refresh that settled after the request was sent"
                );
                return last.clone();
            }

            if let Some(rx) = state.in_flight.as_ref().map(|tx| tx.subscribe()) {
                tracing::debug!("Refresh already in flight, queueing");
                rx
            } else {
                let (tx, rx) = broadcast::channel(1);
                state.in_flight = Some(tx);
                let fut = refresh();
                let guard = FlightGuard {
                    flight: Arc::clone(self),
                    settled: false,
                };
                tokio::spawn(async move {
                    let outcome = fut.await;
                    guard.settle(outcome);
                });
                rx
            }
        };

        rx.recv()
            .await
            .unwrap_or_else(|_| Err(RefreshFailure::new(None, "session refresh was abandoned")))
    }
}

/// Frees the in-flight slot when the refresh task ends, even by panic
struct FlightGuard {
    flight: Arc<SingleFlight>,
    settled: bool,
}

impl FlightGuard {
    fn settle(mut self, outcome: RefreshOutcome) {
        let tx = {
            let mut state = self.flight.state.lock();
            state.generation += 1;
            state.last = Some(outcome.clone());
            state.in_flight.take()
        };
        self.settled = true;
        if let Some(tx) = tx {
            let _ = tx.send(outcome);
        }
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        if !self.settled {
            tracing::error!("Session refresh task ended without an outcome");
            // dropping the sender wakes current waiters with "abandoned"
            self.flight.state.lock().in_flight.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let flight = Arc::new(SingleFlight::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let mut handles = Vec::new();
        for _ in 0..5 {
            let flight = flight.clone();
            let calls = calls.clone();
            let gate = gate.clone();
            handles.push(tokio::spawn(async move {
                flight
                    .run(0, move || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        async move {
                            gate.notified().await;
                            Ok(())
                        }
                    })
                    .await
            }));
        }

        while !flight.is_refreshing() {
            tokio::task::yield_now().await;
        }
        // let every caller reach the queue before releasing
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        gate.notify_one();

        for h in handles {
            assert_eq!(h.await.unwrap(), Ok(()));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(flight.generation(), 1);
    }

    #[tokio::test]
    async fn test_stale_generation_reuses_last_outcome() {
        let flight = Arc::new(SingleFlight::new());
        let failed = flight
            .run(0, || async { Err(RefreshFailure::new(Some(401), "expired")) })
            .await;
        assert!(failed.is_err());

        // sent before the failed refresh settled: same failure, no new refresh
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let reused = flight
            .run(0, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await;
        assert_eq!(reused, failed);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // sent afterwards: a fresh attempt
        let fresh = flight.run(1, || async { Ok(()) }).await;
        assert_eq!(fresh, Ok(()));
    }

    #[tokio::test]
    async fn test_panicking_refresh_frees_the_slot() {
        let flight = Arc::new(SingleFlight::new());
        let explode = true;
        let abandoned = flight
            .run(0, move || async move {
                if explode {
                    panic!("refresh blew up");
                }
                Ok(())
            })
            .await;
        assert_eq!(abandoned.unwrap_err().message, "session refresh was abandoned");
        assert!(!flight.is_refreshing());

        // the next caller starts a new refresh instead of waiting forever
        let next = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            flight.run(0, || async { Ok(()) }),
        )
        .await
        .expect("second refresh hung");
        assert_eq!(next, Ok(()));
        assert_eq!(flight.generation(), 1);
    }
}
