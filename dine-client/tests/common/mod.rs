//! In-memory HTTP backend and socket server for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use dine_client::error::{ClientError, ClientResult};
use dine_client::realtime::{SocketConnection, SocketConnector};
use dine_client::{HttpRequest, HttpResponse, HttpTransport};
use futures::channel::mpsc as fmpsc;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

// ========== HTTP ==========

pub fn ok(data: Value) -> HttpResponse {
    HttpResponse::json(200, &json!({"success": true, "data": data}))
}

pub fn fail(status: u16, message: &str) -> HttpResponse {
    HttpResponse::json(status, &json!({"success": false, "message": message}))
}

type Responder = dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync;

/// Scripted backend: one responder for every request, plus optional gates
/// that hold requests to a path until opened
pub struct MockTransport {
    responder: Box<Responder>,
    requests: Mutex<Vec<HttpRequest>>,
    gates: Mutex<Vec<(String, watch::Receiver<bool>)>>,
}

impl MockTransport {
    pub fn new(responder: impl Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
            gates: Mutex::new(Vec::new()),
        })
    }

    /// Hold requests to `path` until the returned sender sends `true`
    pub fn gate(&self, path: &str) -> watch::Sender<bool> {
        let (tx, rx) = watch::channel(false);
        self.gates.lock().push((path.to_string(), rx));
        tx
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.path == path).count()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        self.requests.lock().push(request.clone());
        let gate = self
            .gates
            .lock()
            .iter()
            .find(|(path, _)| *path == request.path)
            .map(|(_, rx)| rx.clone());
        if let Some(mut gate) = gate {
            gate.wait_for(|open| *open)
                .await
                .map_err(|_| ClientError::Internal("gate dropped".into()))?;
        }
        tokio::task::yield_now().await;
        Ok((self.responder)(&request))
    }
}

// ========== Realtime ==========

/// Server end of one in-memory socket connection
pub struct ServerSocket {
    to_client: fmpsc::UnboundedSender<ClientResult<String>>,
    from_client: fmpsc::UnboundedReceiver<String>,
}

impl ServerSocket {
    pub fn send(&self, frame: impl Into<String>) {
        let _ = self.to_client.unbounded_send(Ok(frame.into()));
    }

    /// Next frame from the client, or panic after a (virtual) minute
    pub async fn recv(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(60), self.from_client.next())
            .await
            .expect("timed out waiting for client frame")
            .expect("client hung up")
    }

    /// Engine.IO open, wait for the namespace connect, acknowledge it
    pub async fn handshake(&mut self) {
        self.send(r#"0{"sid":"eio-1","pingInterval":25000,"pingTimeout":20000}"#);
        assert_eq!(self.recv().await, "40");
        self.send(r#"40{"sid":"sio-1"}"#);
    }

    pub fn emit(&self, event: &str, data: Value) {
        self.send(format!("42{}", json!([event, data])));
    }

    /// Room names carried by the next `join`/`leave` frame
    pub async fn expect_rooms(&mut self, action: &str) -> Vec<String> {
        let frame = self.recv().await;
        let body = frame
            .strip_prefix("42")
            .unwrap_or_else(|| panic!("not an event frame: {frame}"));
        let value: Value = serde_json::from_str(body).unwrap();
        assert_eq!(value[0], action, "unexpected frame {frame}");
        let mut rooms: Vec<String> = value[1]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_str().unwrap().to_string())
            .collect();
        rooms.sort();
        rooms
    }

    /// Simulate a network drop
    pub fn disconnect(self) {
        drop(self);
    }
}

/// Hands out in-memory connections; the test accepts each one
pub struct MemoryConnector {
    accepted: mpsc::UnboundedSender<ServerSocket>,
}

impl MemoryConnector {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ServerSocket>) {
        let (accepted, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { accepted }), rx)
    }
}

#[async_trait]
impl SocketConnector for MemoryConnector {
    async fn connect(&self) -> ClientResult<SocketConnection> {
        let (to_client, client_stream) = fmpsc::unbounded();
        let (client_sink, from_client) = fmpsc::unbounded::<String>();
        self.accepted
            .send(ServerSocket {
                to_client,
                from_client,
            })
            .map_err(|_| ClientError::Realtime("server gone".into()))?;

        let sink = client_sink.sink_map_err(|e| ClientError::Realtime(e.to_string()));
        Ok(SocketConnection::new(sink, client_stream))
    }
}

/// Next connection attempt, or panic after a (virtual) minute
pub async fn accept(server: &mut mpsc::UnboundedReceiver<ServerSocket>) -> ServerSocket {
    tokio::time::timeout(Duration::from_secs(60), server.recv())
        .await
        .expect("no connection attempt")
        .expect("connector dropped")
}

/// Let spawned tasks run
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}
