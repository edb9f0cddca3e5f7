//! Single-order screen: actions, cancellation and fetch ordering

mod common;

use common::{MockTransport, fail, ok, settle};
use dine_client::error::ClientError;
use dine_client::views::{CancelRequest, OrderDetail};
use dine_client::{ApiClient, HttpRequest, HttpResponse, Method};
use parking_lot::Mutex;
use serde_json::{Value, json};
use shared::OrderStatus;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One order as the backend holds it
#[derive(Clone)]
struct Backend {
    order: Arc<Mutex<Value>>,
    reads: Arc<AtomicUsize>,
    /// Answer to this read (1-based) with the order as it was at the start
    stale_read: Option<usize>,
    cancel_fails: bool,
}

impl Backend {
    fn new(status: &str) -> Self {
        Self {
            order: Arc::new(Mutex::new(json!({
                "_id": "o1",
                "status": status,
                "items": [],
                "tableNumber": 4
            }))),
            reads: Arc::new(AtomicUsize::new(0)),
            stale_read: None,
            cancel_fails: false,
        }
    }

    fn status(&self) -> String {
        self.order.lock()["status"].as_str().unwrap_or_default().to_string()
    }

    fn respond(&self, req: &HttpRequest) -> HttpResponse {
        let segments: Vec<&str> = req.path.trim_matches('/').split('/').collect();
        match (req.method, segments.as_slice()) {
            (Method::Get, ["orders", "o1"]) => {
                let n = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
                if self.stale_read == Some(n) {
                    let mut before = self.order.lock().clone();
                    before["status"] = json!("Pending");
                    return ok(before);
                }
                ok(self.order.lock().clone())
            }
            (Method::Patch, ["orders", "o1", "status"]) => {
                let status = req.body.as_ref().map(|b| b["status"].clone());
                let mut order = self.order.lock();
                order["status"] = status.unwrap_or(Value::Null);
                ok(order.clone())
            }
            (Method::Patch, ["orders", "o1", "cancel"]) if self.cancel_fails => {
                fail(500, "Internal server error")
            }
            (Method::Patch, ["orders", "o1", "cancel"]) => {
                let mut order = self.order.lock();
                order["status"] = json!("Cancelled");
                ok(order.clone())
            }
            _ => fail(404, "Route not found"),
        }
    }
}

fn serve(backend: &Backend) -> Arc<MockTransport> {
    let backend = backend.clone();
    MockTransport::new(move |req| backend.respond(req))
}

fn patches(transport: &MockTransport) -> usize {
    transport
        .requests()
        .iter()
        .filter(|r| r.method == Method::Patch)
        .count()
}

#[tokio::test(start_paused = true)]
async fn test_action_result_not_overwritten_by_older_fetch() {
    let mut backend = Backend::new("Pending");
    // the second read was taken before the status change landed
    backend.stale_read = Some(2);
    let transport = serve(&backend);
    let detail = OrderDetail::new(ApiClient::with_transport(transport.clone()), None, "o1");
    settle().await;
    assert_eq!(detail.order().unwrap().status, OrderStatus::Pending);

    let gate = transport.gate("/orders/o1");
    detail.refresh();
    settle().await;
    assert_eq!(transport.count("/orders/o1"), 2);

    let updated = detail.update_status(OrderStatus::InKitchen).await.unwrap();
    assert_eq!(updated.status, OrderStatus::InKitchen);
    assert_eq!(detail.order().unwrap().status, OrderStatus::InKitchen);
    assert_eq!(backend.status(), "InKitchen");

    gate.send(true).unwrap();
    settle().await;
    // well inside the 30s fallback interval
    tokio::time::sleep(Duration::from_secs(1)).await;
    settle().await;
    assert!(transport.count("/orders/o1") >= 3);
    assert_eq!(
        detail.view().ready().map(|o| o.status),
        Some(OrderStatus::InKitchen)
    );
}

#[tokio::test(start_paused = true)]
async fn test_action_before_first_fetch_is_shown() {
    let backend = Backend::new("Pending");
    let transport = serve(&backend);
    let gate = transport.gate("/orders/o1");
    let detail = OrderDetail::new(ApiClient::with_transport(transport.clone()), None, "o1");
    settle().await;
    assert!(detail.view().is_loading());

    detail.update_status(OrderStatus::InKitchen).await.unwrap();
    assert_eq!(
        detail.view().ready().map(|o| o.status),
        Some(OrderStatus::InKitchen)
    );

    gate.send(true).unwrap();
    settle().await;
    assert_eq!(detail.order().unwrap().status, OrderStatus::InKitchen);
}

#[tokio::test(start_paused = true)]
async fn test_failed_cancel_leaves_order_untouched() {
    let mut backend = Backend::new("InKitchen");
    backend.cancel_fails = true;
    let transport = serve(&backend);
    let detail = OrderDetail::new(ApiClient::with_transport(transport.clone()), None, "o1");
    settle().await;
    assert!(detail.can_cancel());

    let confirmed = CancelRequest::new("guest left").unwrap().confirm();
    let err = detail.cancel(confirmed).await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 500, .. }), "{err}");
    assert_eq!(detail.order().unwrap().status, OrderStatus::InKitchen);
    assert_eq!(backend.status(), "InKitchen");

    let cancel = transport
        .requests()
        .into_iter()
        .find(|r| r.path == "/orders/o1/cancel")
        .unwrap();
    assert_eq!(cancel.body, Some(json!({"reason": "guest left"})));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_on_paid_order_sends_nothing() {
    let backend = Backend::new("Paid");
    let transport = serve(&backend);
    let detail = OrderDetail::new(ApiClient::with_transport(transport.clone()), None, "o1");
    settle().await;
    assert!(!detail.can_cancel());

    let confirmed = CancelRequest::new("wrong table").unwrap().confirm();
    let err = detail.cancel(confirmed).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)), "{err}");
    assert_eq!(patches(&transport), 0);
    assert_eq!(detail.order().unwrap().status, OrderStatus::Paid);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_adopts_backend_answer() {
    let backend = Backend::new("Pending");
    let transport = serve(&backend);
    let detail = OrderDetail::new(ApiClient::with_transport(transport.clone()), None, "o1");
    settle().await;

    let confirmed = CancelRequest::new("duplicate").unwrap().confirm();
    let order = detail.cancel(confirmed).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(detail.order().unwrap().status, OrderStatus::Cancelled);
    assert!(!detail.can_cancel());
}
