//! Session refresh under concurrent 401s

mod common;

use common::{MockTransport, fail, ok};
use dine_client::{ApiClient, AuthEvent, ClientError, ErrorKind, SessionGate};
use serde_json::{Value, json};
use std::time::Duration;

const REFRESH: &str = "/auth/refresh-token";

async fn wait_until(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition never held");
}

fn user_json() -> Value {
    json!({
        "_id": "u1",
        "firstName": "Sita",
        "lastName": "Rai",
        "email": "sita@example.com",
        "role": {"_id": "r1", "name": "chef"}
    })
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let transport = MockTransport::new(|req| match req.path.as_str() {
        REFRESH => ok(json!({"accessToken": "fresh"})),
        _ if req.bearer.as_deref() == Some("fresh") => ok(json!({"path": req.path})),
        _ => fail(401, "jwt expired"),
    });
    let gate = transport.gate(REFRESH);
    let api = ApiClient::with_transport(transport.clone());
    api.set_access_token(Some("stale".into()));
    let mut events = api.subscribe_auth_events();

    const N: usize = 6;
    let handles: Vec<_> = (0..N)
        .map(|i| {
            let api = api.clone();
            tokio::spawn(async move { api.get::<Value>(&format!("/orders/o{i}")).await })
        })
        .collect();

    wait_until(|| transport.count(REFRESH) == 1).await;
    wait_until(|| transport.requests().len() == N + 1).await;
    assert!(api.is_refreshing());
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    gate.send_replace(true);

    for (i, handle) in handles.into_iter().enumerate() {
        let value = handle.await.unwrap().unwrap();
        assert_eq!(value["path"], format!("/orders/o{i}"));
    }
    assert_eq!(transport.count(REFRESH), 1);
    // every request went out twice: once stale, once retried
    assert_eq!(transport.requests().len(), 2 * N + 1);
    assert_eq!(api.access_token().as_deref(), Some("fresh"));
    assert_eq!(events.recv().await.unwrap(), AuthEvent::Refreshed);
}

#[tokio::test]
async fn test_two_requests_share_a_failed_refresh() {
    let transport = MockTransport::new(|req| match req.path.as_str() {
        REFRESH => fail(401, "Refresh token expired"),
        "/auth/login" => ok(json!({"user": user_json(), "accessToken": "t0"})),
        _ => fail(401, "jwt expired"),
    });
    let gate = transport.gate(REFRESH);
    let api = ApiClient::with_transport(transport.clone());
    let session = SessionGate::new(api.clone(), None);
    session.login("sita@example.com", "secret").await.unwrap();
    assert!(session.is_authenticated());
    let mut events = api.subscribe_auth_events();

    let first = tokio::spawn({
        let api = api.clone();
        async move { api.get::<Value>("/orders").await }
    });
    let second = tokio::spawn({
        let api = api.clone();
        async move { api.get::<Value>("/tables").await }
    });

    wait_until(|| transport.count(REFRESH) == 1).await;
    wait_until(|| transport.count("/orders") == 1 && transport.count("/tables") == 1).await;
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    gate.send_replace(true);

    for handle in [first, second] {
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired(_)), "{err:?}");
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }
    assert_eq!(transport.count(REFRESH), 1);
    // failed refresh: nobody retried
    assert_eq!(transport.count("/orders"), 1);
    assert_eq!(transport.count("/tables"), 1);
    assert_eq!(api.access_token(), None);
    assert!(matches!(
        events.recv().await.unwrap(),
        AuthEvent::SessionExpired { .. }
    ));

    wait_until(|| !session.is_authenticated()).await;
    assert!(!session.state().is_loading);
}

#[tokio::test]
async fn test_auth_endpoints_never_trigger_refresh() {
    let transport = MockTransport::new(|_| fail(401, "Invalid credentials"));
    let api = ApiClient::with_transport(transport.clone());

    let err = api
        .post::<Value, _>("/auth/login", &json!({"email": "a@b.co", "password": "x"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    assert!(api.auth().verify().await.is_err());
    assert_eq!(transport.count(REFRESH), 0);
}

#[tokio::test]
async fn test_later_401_starts_a_new_refresh() {
    let transport = MockTransport::new(|req| match req.path.as_str() {
        REFRESH => fail(401, "Refresh token expired"),
        _ => fail(401, "jwt expired"),
    });
    let api = ApiClient::with_transport(transport.clone());

    assert!(api.get::<Value>("/orders").await.is_err());
    assert_eq!(transport.count(REFRESH), 1);

    // sent after the first refresh settled, so it gets its own attempt
    assert!(api.get::<Value>("/orders").await.is_err());
    assert_eq!(transport.count(REFRESH), 2);
}
