//! Room membership, dispatch and reconnect over an in-memory socket

mod common;

use common::{MemoryConnector, accept, settle};
use dine_client::realtime::{Backoff, ConnectionState, Handlers, RealtimeChannel};
use serde_json::{Value, json};
use shared::{OrderEvent, Room};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn counter() -> (Arc<AtomicUsize>, impl Fn(&Value) + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    (count, move |_: &Value| {
        c.fetch_add(1, Ordering::SeqCst);
    })
}

#[tokio::test(start_paused = true)]
async fn test_rooms_rejoined_after_reconnect() {
    let (connector, mut server) = MemoryConnector::new();
    let channel = RealtimeChannel::with_connector(connector, Backoff::default());

    let (events, on_new) = counter();
    let sub = channel.subscribe([Room::Kitchen], Handlers::new().on(OrderEvent::New, on_new));
    let reconnects = Arc::new(AtomicUsize::new(0));
    let r = reconnects.clone();
    sub.on_reconnect(move || {
        r.fetch_add(1, Ordering::SeqCst);
    });

    let mut socket = accept(&mut server).await;
    socket.handshake().await;
    assert_eq!(socket.expect_rooms("join").await, ["kitchen"]);
    settle().await;
    assert_eq!(channel.state(), ConnectionState::Connected);
    // first connect is not a reconnect
    assert_eq!(reconnects.load(Ordering::SeqCst), 0);

    socket.emit("order:new", json!({"orderId": "o1"}));
    settle().await;
    assert_eq!(events.load(Ordering::SeqCst), 1);

    socket.disconnect();
    settle().await;
    assert_ne!(channel.state(), ConnectionState::Connected);

    // no consumer action: the channel reconnects and rejoins on its own
    let mut socket = accept(&mut server).await;
    socket.handshake().await;
    assert_eq!(socket.expect_rooms("join").await, ["kitchen"]);
    settle().await;
    assert!(channel.is_connected());
    assert_eq!(reconnects.load(Ordering::SeqCst), 1);

    socket.emit("order:new", json!({"orderId": "o2"}));
    settle().await;
    assert_eq!(events.load(Ordering::SeqCst), 2);
    drop(sub);
}

#[tokio::test(start_paused = true)]
async fn test_shared_rooms_are_reference_counted() {
    let (connector, mut server) = MemoryConnector::new();
    let channel = RealtimeChannel::with_connector(connector, Backoff::default());

    let kitchen_only = channel.subscribe([Room::Kitchen], Handlers::new());
    let both = channel.subscribe([Room::Kitchen, Room::Dashboard], Handlers::new());

    let mut socket = accept(&mut server).await;
    socket.handshake().await;
    assert_eq!(socket.expect_rooms("join").await, ["dashboard", "kitchen"]);

    // still held by the other subscription: nothing leaves
    drop(kitchen_only);
    settle().await;
    assert_eq!(channel.desired_rooms(), [Room::Kitchen, Room::Dashboard]);

    let table = channel.subscribe([Room::table("t7")], Handlers::new());
    assert_eq!(socket.expect_rooms("join").await, ["table:t7"]);

    both.unsubscribe();
    assert_eq!(socket.expect_rooms("leave").await, ["dashboard", "kitchen"]);
    assert_eq!(channel.desired_rooms(), [Room::table("t7")]);
    drop(table);
}

#[tokio::test(start_paused = true)]
async fn test_set_rooms_sends_only_the_difference() {
    let (connector, mut server) = MemoryConnector::new();
    let channel = RealtimeChannel::with_connector(connector, Backoff::default());
    let sub = channel.subscribe([Room::order("o1"), Room::Kitchen], Handlers::new());

    let mut socket = accept(&mut server).await;
    socket.handshake().await;
    assert_eq!(socket.expect_rooms("join").await, ["kitchen", "order:o1"]);

    sub.set_rooms([Room::Kitchen, Room::order("o2")]);
    assert_eq!(socket.expect_rooms("join").await, ["order:o2"]);
    assert_eq!(socket.expect_rooms("leave").await, ["order:o1"]);
}

#[tokio::test(start_paused = true)]
async fn test_handler_swap_and_drop() {
    let (connector, mut server) = MemoryConnector::new();
    let channel = RealtimeChannel::with_connector(connector, Backoff::default());

    let (old_count, old) = counter();
    let (new_count, new) = counter();
    let sub = channel.subscribe(
        [Room::order("o1")],
        Handlers::new().on(OrderEvent::StatusUpdated, old),
    );

    let mut socket = accept(&mut server).await;
    socket.handshake().await;
    socket.expect_rooms("join").await;

    socket.emit("order:status-updated", json!({"orderId": "o1"}));
    settle().await;
    sub.set_handler("order:status-updated", new);
    socket.emit("order:status-updated", json!({"orderId": "o1"}));
    socket.emit("order:paid", json!({"orderId": "o1"}));
    settle().await;
    assert_eq!(old_count.load(Ordering::SeqCst), 1);
    assert_eq!(new_count.load(Ordering::SeqCst), 1);

    drop(sub);
    assert_eq!(socket.expect_rooms("leave").await, ["order:o1"]);
    socket.emit("order:status-updated", json!({"orderId": "o1"}));
    settle().await;
    assert_eq!(new_count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_pings_are_answered() {
    let (connector, mut server) = MemoryConnector::new();
    let channel = RealtimeChannel::with_connector(connector, Backoff::default());

    let mut socket = accept(&mut server).await;
    socket.handshake().await;
    socket.send("2");
    assert_eq!(socket.recv().await, "3");

    channel.shutdown();
    settle().await;
    assert_eq!(channel.state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_keeps_retrying_failed_connects() {
    let (connector, mut server) = MemoryConnector::new();
    let channel = RealtimeChannel::with_connector(connector, Backoff::default());

    // refuse the namespace several times; the channel keeps coming back
    for _ in 0..4 {
        let mut socket = accept(&mut server).await;
        socket.send(r#"0{"sid":"eio","pingInterval":25000,"pingTimeout":20000}"#);
        assert_eq!(socket.recv().await, "40");
        socket.send(r#"44{"message":"not authorized"}"#);
        settle().await;
    }
    let mut socket = accept(&mut server).await;
    socket.handshake().await;
    settle().await;
    assert!(channel.is_connected());
}

#[tokio::test(start_paused = true)]
async fn test_silent_server_counts_as_lost() {
    let (connector, mut server) = MemoryConnector::new();
    let channel = RealtimeChannel::with_connector(connector, Backoff::default());
    let sub = channel.subscribe([Room::Kitchen], Handlers::new());
    let reconnects = Arc::new(AtomicUsize::new(0));
    let r = reconnects.clone();
    sub.on_reconnect(move || {
        r.fetch_add(1, Ordering::SeqCst);
    });

    // pingInterval 25 s + pingTimeout 20 s from the handshake
    let mut socket = accept(&mut server).await;
    socket.handshake().await;
    assert_eq!(socket.expect_rooms("join").await, ["kitchen"]);

    // regular pings keep the link alive well past the window
    for _ in 0..3 {
        tokio::time::sleep(Duration::from_secs(30)).await;
        socket.send("2");
        assert_eq!(socket.recv().await, "3");
    }
    assert!(channel.is_connected());

    // socket stays open, server says nothing
    tokio::time::sleep(Duration::from_secs(44)).await;
    assert!(channel.is_connected());
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_ne!(channel.state(), ConnectionState::Connected);

    let mut next = accept(&mut server).await;
    next.handshake().await;
    assert_eq!(next.expect_rooms("join").await, ["kitchen"]);
    settle().await;
    assert!(channel.is_connected());
    assert_eq!(reconnects.load(Ordering::SeqCst), 1);
    drop(socket);
}
