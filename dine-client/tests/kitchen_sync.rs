//! Kitchen queue against a stateful in-memory backend

mod common;

use common::{MemoryConnector, MockTransport, accept, fail, ok, settle};
use dine_client::realtime::{Backoff, RealtimeChannel};
use dine_client::views::KitchenQueue;
use dine_client::{ApiClient, HttpRequest, HttpResponse, Method};
use parking_lot::Mutex;
use serde_json::{Value, json};
use shared::models::ItemCounts;
use shared::{ItemStatus, Order, OrderStatus};
use std::sync::Arc;
use std::time::Duration;

/// Orders as the backend holds them
#[derive(Clone)]
struct Kitchen {
    orders: Arc<Mutex<Vec<Value>>>,
}

impl Kitchen {
    fn new(orders: Vec<Value>) -> Self {
        Self {
            orders: Arc::new(Mutex::new(orders)),
        }
    }

    fn set_item(&self, order_id: &str, item_id: &str, status: &str) -> Option<Value> {
        let mut orders = self.orders.lock();
        let order = orders.iter_mut().find(|o| o["_id"] == order_id)?;
        let item = order["items"]
            .as_array_mut()?
            .iter_mut()
            .find(|i| i["_id"] == item_id)?;
        item["status"] = json!(status);
        Some(order.clone())
    }

    fn push(&self, order: Value) {
        self.orders.lock().push(order);
    }

    fn snapshot(&self) -> Vec<Order> {
        serde_json::from_value(Value::Array(self.orders.lock().clone())).unwrap()
    }

    fn respond(&self, req: &HttpRequest) -> HttpResponse {
        let segments: Vec<&str> = req.path.trim_matches('/').split('/').collect();
        match (req.method, segments.as_slice()) {
            (Method::Get, ["orders", "kitchen", "queue"]) => {
                ok(Value::Array(self.orders.lock().clone()))
            }
            (Method::Patch, ["orders", order_id, "items", item_id, "status"]) => {
                let status = req
                    .body
                    .as_ref()
                    .and_then(|b| b["status"].as_str())
                    .unwrap_or_default();
                match self.set_item(order_id, item_id, status) {
                    Some(order) => ok(order),
                    None => fail(404, "Order not found"),
                }
            }
            _ => fail(404, "Route not found"),
        }
    }
}

fn item(id: &str, name: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "menuItem": {"_id": format!("m-{id}"), "name": name, "price": 300},
        "quantity": 1,
        "status": status
    })
}

fn table_seven() -> Value {
    json!({
        "_id": "o7",
        "table": {"_id": "t7", "tableNumber": 7},
        "customerName": "Asha",
        "status": "Pending",
        "items": [item("i1", "Momo", "Pending"), item("i2", "Thukpa", "Cooking")]
    })
}

fn queue_fetches(transport: &MockTransport) -> usize {
    transport.count("/orders/kitchen/queue")
}

#[tokio::test(start_paused = true)]
async fn test_table_seven_item_marked_ready() {
    let kitchen = Kitchen::new(vec![table_seven()]);
    let backend = kitchen.clone();
    let transport = MockTransport::new(move |req| backend.respond(req));
    let queue = KitchenQueue::new(ApiClient::with_transport(transport.clone()), None);
    settle().await;

    let snapshot = queue.view().ready().cloned().expect("queue loaded");
    assert_eq!(snapshot.counts.pending, 1);
    assert_eq!(snapshot.counts.cooking, 1);

    let updated = queue
        .advance_item("o7", "i2", Some("u-chef".into()))
        .await
        .unwrap();
    assert_eq!(updated.item("i2").map(|i| i.status), Some(ItemStatus::Ready));
    // the backend did not move the order; neither does the client
    assert_eq!(updated.status, OrderStatus::Pending);

    let patch = transport
        .requests()
        .into_iter()
        .find(|r| r.method == Method::Patch)
        .unwrap();
    assert_eq!(patch.path, "/orders/o7/items/i2/status");
    assert_eq!(patch.body, Some(json!({"status": "Ready", "cookedBy": "u-chef"})));

    settle().await;
    let snapshot = queue.view().ready().cloned().unwrap();
    assert_eq!(snapshot.counts.pending, 1);
    assert_eq!(snapshot.counts.cooking, 0);
    assert_eq!(snapshot.counts.ready, 1);
    let ticket = snapshot.ticket("o7").unwrap();
    assert_eq!(ticket.status, OrderStatus::Pending);
    assert_eq!(ticket.table_number, Some(7));
    assert!(ticket.has_pending_item);
    assert!(!ticket.all_ready);
    assert_eq!(ticket.items[0].action, Some(ItemStatus::Cooking));
    assert_eq!(ticket.items[1].action, None);
}

#[tokio::test(start_paused = true)]
async fn test_ready_item_has_no_kitchen_action() {
    let kitchen = Kitchen::new(vec![table_seven()]);
    kitchen.set_item("o7", "i2", "Ready");
    let backend = kitchen.clone();
    let transport = MockTransport::new(move |req| backend.respond(req));
    let queue = KitchenQueue::new(ApiClient::with_transport(transport.clone()), None);
    settle().await;

    let err = queue.advance_item("o7", "i2", None).await.unwrap_err();
    assert_eq!(err.kind(), dine_client::ErrorKind::Validation);
    assert!(transport.requests().iter().all(|r| r.method == Method::Get));
}

#[tokio::test(start_paused = true)]
async fn test_push_and_poll_converge() {
    let kitchen = Kitchen::new(vec![table_seven()]);
    let backend = kitchen.clone();
    let transport = MockTransport::new(move |req| backend.respond(req));
    let (connector, mut server) = MemoryConnector::new();
    let channel = RealtimeChannel::with_connector(connector, Backoff::default());
    let queue = KitchenQueue::new(ApiClient::with_transport(transport.clone()), Some(&channel));

    let mut socket = accept(&mut server).await;
    socket.handshake().await;
    assert_eq!(socket.expect_rooms("join").await, ["kitchen"]);
    settle().await;
    let polled = queue_fetches(&transport);
    assert!(polled >= 1);

    // a push pulls the next fetch forward, well before the 30 s tick
    kitchen.push(json!({
        "_id": "o8",
        "table": {"_id": "t2", "tableNumber": 2},
        "status": "Pending",
        "items": [item("i3", "Lassi", "Pending")]
    }));
    socket.emit("order:new", json!({"orderId": "o8", "tableNumber": 2}));
    settle().await;
    assert!(queue_fetches(&transport) > polled);
    assert_eq!(
        queue.view().ready().unwrap().counts,
        ItemCounts::from_orders(&kitchen.snapshot())
    );

    // duplicated and reordered hints, changes behind the client's back, ticks
    kitchen.set_item("o7", "i1", "Cooking");
    socket.emit("order:item-updated", json!({"orderId": "o7"}));
    socket.emit("order:item-updated", json!({"orderId": "o7"}));
    kitchen.set_item("o8", "i3", "Ready");
    tokio::time::sleep(Duration::from_secs(31)).await;
    socket.emit("order:status-updated", json!({"orderId": "o8"}));
    kitchen.set_item("o7", "i2", "Served");
    socket.emit("order:item-updated", json!({"orderId": "o7"}));
    settle().await;

    let expected = ItemCounts::from_orders(&kitchen.snapshot());
    assert_eq!(queue.view().ready().unwrap().counts, expected);
    assert_eq!(expected.pending, 0);
    assert_eq!(expected.cooking, 1);
    assert_eq!(expected.ready, 1);
    assert_eq!(expected.served, 1);

    // an event the queue does not listen for changes nothing
    socket.emit("order:paid", json!({"orderId": "o7"}));
    settle().await;
    assert_eq!(queue.view().ready().unwrap().counts, expected);
}
