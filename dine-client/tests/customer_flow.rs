//! QR ordering: cart checkout and table tracking

mod common;

use common::{MockTransport, fail, ok, settle};
use dine_client::views::{TableLookup, TableTracker, TrackingStep};
use dine_client::{ApiClient, Cart, ViewState};
use rust_decimal::Decimal;
use serde_json::json;
use shared::models::MenuItemSummary;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn momo() -> MenuItemSummary {
    MenuItemSummary {
        id: "m1".into(),
        name: "Momo".into(),
        price: Decimal::from(250),
    }
}

#[tokio::test]
async fn test_cart_cleared_only_after_backend_accepts() {
    let accept = Arc::new(AtomicBool::new(false));
    let flag = accept.clone();
    let transport = MockTransport::new(move |req| {
        if flag.load(Ordering::SeqCst) {
            ok(json!({"_id": "o1", "status": "Pending", "items": []}))
        } else {
            fail(422, format!("Menu item unavailable ({})", req.path).as_str())
        }
    });
    let orders = ApiClient::with_transport(transport.clone()).orders();

    let mut cart = Cart::new();
    cart.set_table("t7", 7);
    cart.set_customer_name("Asha");
    cart.add_item(momo(), 2, Some("less chilli".into()));
    cart.add_item(momo(), 3, None);

    let err = cart.submit(&orders).await.unwrap_err();
    assert!(err.to_string().contains("Menu item unavailable"));
    assert_eq!(cart.item_count(), 5);
    assert_eq!(cart.customer_name(), "Asha");

    accept.store(true, Ordering::SeqCst);
    let order = cart.submit(&orders).await.unwrap();
    assert_eq!(order.id, "o1");
    assert!(cart.is_empty());
    assert_eq!(cart.customer_name(), "");

    let body = transport.requests()[1].body.clone().unwrap();
    assert_eq!(
        body,
        json!({
            "tableId": "t7",
            "customerName": "Asha",
            "items": [{"menuItem": "m1", "quantity": 5, "notes": "less chilli"}]
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_tracker_polls_only_after_table_resolves() {
    let transport = MockTransport::new(|req| match req.path.as_str() {
        "/qr/order/table-number/7" => ok(json!({
            "table": {"_id": "t7", "tableNumber": 7},
            "menu": []
        })),
        "/orders/public/table/t7" => ok(json!([
            {"_id": "o1", "status": "InKitchen", "totalAmount": 500, "items": []},
            {"_id": "o2", "status": "Cancelled", "totalAmount": 120, "items": []}
        ])),
        _ => fail(404, "Route not found"),
    });
    let tracker = TableTracker::new(
        ApiClient::with_transport(transport.clone()),
        None,
        TableLookup::Number(7),
    );

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(transport.requests().is_empty());
    assert!(tracker.view().is_loading());

    assert_eq!(tracker.resolve().await.unwrap(), "t7");
    settle().await;
    assert_eq!(transport.count("/orders/public/table/t7"), 1);

    let ViewState::Ready(orders) = tracker.view() else {
        panic!("tracker not ready");
    };
    assert_eq!(orders[0].step, Some(TrackingStep::Preparing));
    assert_eq!(orders[1].step, None);

    tokio::time::sleep(Duration::from_secs(16)).await;
    assert_eq!(transport.count("/orders/public/table/t7"), 2);

    // already resolved: no second lookup
    tracker.resolve().await.unwrap();
    assert_eq!(transport.count("/qr/order/table-number/7"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_tracker_with_known_id_and_no_orders_is_empty() {
    let transport = MockTransport::new(|_| ok(json!([])));
    let tracker = TableTracker::new(
        ApiClient::with_transport(transport.clone()),
        None,
        TableLookup::Id("t3".into()),
    );
    settle().await;

    assert!(tracker.is_resolved());
    assert!(matches!(tracker.view(), ViewState::Empty));
    assert_eq!(transport.count("/orders/public/table/t3"), 1);
}
