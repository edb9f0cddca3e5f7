//! Realtime channel: one background task owning the WebSocket
//!
//! 1. Connect, complete the Socket.IO handshake
//! 2. Join every room some subscription still wants
//! 3. Run reconnect hooks (consumers refetch whatever they missed)
//! 4. Dispatch events to subscription handlers in receive order
//! 5. On loss, back off (doubling, capped) and start over

use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use shared::Room;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::codec::{self, EnginePacket, SocketPacket};
use super::connector::{FrameSink, SocketConnection, SocketConnector, TungsteniteConnector};
use super::subscription::{Handlers, Subscription, SubscriptionEntry};
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Silence allowed before the server's open packet states its own
/// (Engine.IO defaults: 25 s ping interval plus 20 s ping timeout)
const DEFAULT_SILENCE_LIMIT: Duration = Duration::from_secs(45);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

/// Reconnect timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    /// 0 means retry forever
    pub max_attempts: u32,
}

impl Backoff {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            initial: config.reconnect_delay,
            max: config.max_reconnect_delay,
            max_attempts: config.max_reconnect_attempts,
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

#[derive(Debug)]
enum Command {
    Join(Vec<Room>),
    Leave(Vec<Room>),
}

struct ChannelInner {
    subscriptions: DashMap<Uuid, Arc<SubscriptionEntry>>,
    /// Desired rooms with the number of subscriptions holding each
    rooms: Mutex<BTreeMap<Room, usize>>,
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Sender<ConnectionState>,
    shutdown: CancellationToken,
}

/// Handle to the shared realtime connection; clones share it
#[derive(Clone)]
pub struct RealtimeChannel {
    inner: Arc<ChannelInner>,
}

impl std::fmt::Debug for RealtimeChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeChannel")
            .field("state", &self.state())
            .field("subscriptions", &self.inner.subscriptions.len())
            .finish()
    }
}

impl RealtimeChannel {
    /// Connect to the backend derived from `config`; must run inside a tokio runtime
    pub fn connect(config: &ClientConfig) -> Self {
        let connector = TungsteniteConnector::new(config.websocket_url());
        Self::with_connector(Arc::new(connector), Backoff::from_config(config))
    }

    pub fn with_connector(connector: Arc<dyn SocketConnector>, backoff: Backoff) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(ConnectionState::Connecting);
        let channel = Self {
            inner: Arc::new(ChannelInner {
                subscriptions: DashMap::new(),
                rooms: Mutex::new(BTreeMap::new()),
                commands,
                state,
                shutdown: CancellationToken::new(),
            }),
        };

        let worker = SocketWorker {
            inner: channel.inner.clone(),
            connector,
            backoff,
            commands: command_rx,
        };
        tokio::spawn(worker.run());
        channel
    }

    /// Join `rooms` and route events to `handlers` until the handle is dropped
    pub fn subscribe(&self, rooms: impl IntoIterator<Item = Room>, handlers: Handlers) -> Subscription {
        let rooms: BTreeSet<Room> = rooms.into_iter().collect();
        let id = Uuid::new_v4();
        let entry = Arc::new(SubscriptionEntry::new(rooms.clone(), handlers));
        self.inner.subscriptions.insert(id, entry.clone());
        self.acquire_rooms(rooms);
        tracing::debug!(%id, "Realtime subscription added");
        Subscription::new(id, entry, self.clone())
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Rooms currently wanted by at least one subscription
    pub fn desired_rooms(&self) -> Vec<Room> {
        self.inner.rooms.lock().keys().cloned().collect()
    }

    /// Stop the socket task; subscriptions stay valid but receive nothing
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
    }

    pub(crate) fn acquire_rooms(&self, rooms: impl IntoIterator<Item = Room>) {
        let newly: Vec<Room> = {
            let mut counts = self.inner.rooms.lock();
            rooms
                .into_iter()
                .filter(|room| {
                    let count = counts.entry(room.clone()).or_insert(0);
                    *count += 1;
                    *count == 1
                })
                .collect()
        };
        if !newly.is_empty() {
            let _ = self.inner.commands.send(Command::Join(newly));
        }
    }

    pub(crate) fn release_rooms(&self, rooms: impl IntoIterator<Item = Room>) {
        let emptied: Vec<Room> = {
            let mut counts = self.inner.rooms.lock();
            rooms
                .into_iter()
                .filter(|room| match counts.get_mut(room) {
                    Some(count) if *count > 1 => {
                        *count -= 1;
                        false
                    }
                    Some(_) => {
                        counts.remove(room);
                        true
                    }
                    None => false,
                })
                .collect()
        };
        if !emptied.is_empty() {
            let _ = self.inner.commands.send(Command::Leave(emptied));
        }
    }

    pub(crate) fn remove_subscription(&self, id: &Uuid) {
        self.inner.subscriptions.remove(id);
        tracing::debug!(%id, "Realtime subscription removed");
    }
}

impl ChannelInner {
    fn set_state(&self, state: ConnectionState) {
        self.state.send_if_modified(|current| {
            let changed = *current != state;
            *current = state;
            changed
        });
    }

    /// Call every handler registered for `event`, outside the registry locks
    fn dispatch(&self, event: &str, data: &Value) {
        let handlers: Vec<_> = self
            .subscriptions
            .iter()
            .filter_map(|entry| entry.value().handler(event))
            .collect();
        tracing::trace!(event, handlers = handlers.len(), "Dispatching realtime event");
        for handler in handlers {
            handler(data);
        }
    }

    fn run_reconnect_hooks(&self) {
        let hooks: Vec<_> = self
            .subscriptions
            .iter()
            .filter_map(|entry| entry.value().reconnect_hook())
            .collect();
        for hook in hooks {
            hook();
        }
    }
}

enum SessionEnd {
    Shutdown,
    Lost { established: bool },
}

struct SocketWorker {
    inner: Arc<ChannelInner>,
    connector: Arc<dyn SocketConnector>,
    backoff: Backoff,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl SocketWorker {
    async fn run(mut self) {
        tracing::info!("Realtime channel started");
        let shutdown = self.inner.shutdown.clone();
        let mut delay = self.backoff.initial;
        let mut failures: u32 = 0;
        let mut connected_before = false;

        loop {
            if shutdown.is_cancelled() {
                break;
            }
            self.inner.set_state(ConnectionState::Connecting);

            let connection = tokio::select! {
                _ = shutdown.cancelled() => break,
                result = self.connector.connect() => result,
            };

            match connection {
                Ok(connection) => match self.run_session(connection, connected_before).await {
                    SessionEnd::Shutdown => break,
                    SessionEnd::Lost { established } => {
                        if established {
                            connected_before = true;
                            delay = self.backoff.initial;
                            failures = 0;
                        }
                    }
                },
                Err(e) => {
                    tracing::warn!(delay_ms = delay.as_millis() as u64, "Realtime connect failed: {e}");
                }
            }

            self.inner.set_state(ConnectionState::Disconnected);
            failures += 1;
            if self.backoff.max_attempts > 0 && failures >= self.backoff.max_attempts {
                tracing::error!(attempts = failures, "Giving up on realtime reconnects");
                break;
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {},
            }
            delay = (delay * 2).min(self.backoff.max);
        }

        self.inner.set_state(ConnectionState::Disconnected);
        tracing::info!("Realtime channel stopped");
    }

    /// One connection, until it drops or shutdown
    async fn run_session(&mut self, connection: SocketConnection, reconnect: bool) -> SessionEnd {
        let SocketConnection {
            mut sink,
            mut stream,
        } = connection;
        let shutdown = self.inner.shutdown.clone();
        let mut established = false;
        // the server pings every interval; any frame proves the link is alive
        let mut silence_limit = DEFAULT_SILENCE_LIMIT;
        let mut deadline = Instant::now() + silence_limit;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    let _ = sink.close().await;
                    return SessionEnd::Shutdown;
                }

                _ = tokio::time::sleep_until(deadline) => {
                    tracing::warn!(
                        silence_ms = silence_limit.as_millis() as u64,
                        "Realtime server went silent, reconnecting"
                    );
                    return SessionEnd::Lost { established };
                }

                command = self.commands.recv(), if established => {
                    let result = match command {
                        Some(Command::Join(rooms)) => send_rooms(&mut sink, "join", &rooms).await,
                        Some(Command::Leave(rooms)) => send_rooms(&mut sink, "leave", &rooms).await,
                        None => return SessionEnd::Shutdown,
                    };
                    if let Err(e) = result {
                        tracing::warn!("Realtime send failed, disconnecting: {e}");
                        return SessionEnd::Lost { established };
                    }
                }

                frame = stream.next() => {
                    let text = match frame {
                        Some(Ok(text)) => text,
                        Some(Err(e)) => {
                            tracing::warn!("Realtime connection error: {e}");
                            return SessionEnd::Lost { established };
                        }
                        None => {
                            tracing::info!("Realtime connection ended");
                            return SessionEnd::Lost { established };
                        }
                    };

                    deadline = Instant::now() + silence_limit;

                    let packet = match codec::decode(&text) {
                        Ok(packet) => packet,
                        Err(e) => {
                            tracing::debug!(frame = %text, "Ignoring undecodable frame: {e}");
                            continue;
                        }
                    };

                    let result = match packet {
                        EnginePacket::Open(info) => {
                            tracing::debug!(sid = %info.sid, "Engine.IO session opened");
                            if let Some(limit) = info.silence_limit() {
                                silence_limit = limit;
                                deadline = Instant::now() + silence_limit;
                            }
                            sink.send(codec::encode_connect()).await
                        }
                        EnginePacket::Ping(payload) => sink.send(codec::encode_pong(&payload)).await,
                        EnginePacket::Close => {
                            tracing::info!("Realtime connection closed by server");
                            return SessionEnd::Lost { established };
                        }
                        EnginePacket::Message(SocketPacket::Connect(_)) => {
                            established = true;
                            self.on_established(&mut sink, reconnect).await
                        }
                        EnginePacket::Message(SocketPacket::Event { name, data }) => {
                            self.inner.dispatch(&name, &data);
                            Ok(())
                        }
                        EnginePacket::Message(SocketPacket::ConnectError(reason)) => {
                            tracing::warn!(%reason, "Realtime namespace connect refused");
                            return SessionEnd::Lost { established };
                        }
                        EnginePacket::Message(SocketPacket::Disconnect) => {
                            tracing::info!("Realtime namespace disconnected by server");
                            return SessionEnd::Lost { established };
                        }
                        EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => Ok(()),
                    };

                    if let Err(e) = result {
                        tracing::warn!("Realtime send failed, disconnecting: {e}");
                        return SessionEnd::Lost { established };
                    }
                }
            }
        }
    }

    /// Namespace connected: join the full room set, then let consumers refetch
    async fn on_established(&mut self, sink: &mut FrameSink, reconnect: bool) -> ClientResult<()> {
        // the full set supersedes anything queued while disconnected
        while self.commands.try_recv().is_ok() {}

        let rooms: Vec<Room> = self.inner.rooms.lock().keys().cloned().collect();
        if !rooms.is_empty() {
            send_rooms(sink, "join", &rooms).await?;
        }
        self.inner.set_state(ConnectionState::Connected);
        tracing::info!(rooms = rooms.len(), reconnect, "Realtime channel connected");

        if reconnect {
            self.inner.run_reconnect_hooks();
        }
        Ok(())
    }
}

async fn send_rooms(sink: &mut FrameSink, action: &str, rooms: &[Room]) -> ClientResult<()> {
    let names: Vec<Value> = rooms.iter().map(|r| Value::String(r.to_string())).collect();
    tracing::debug!(action, rooms = ?names, "Room membership change");
    sink.send(codec::encode_event(action, &Value::Array(names)))
        .await
}
