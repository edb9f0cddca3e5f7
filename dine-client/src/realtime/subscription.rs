//! Subscription handles
//!
//! A [`Subscription`] owns a set of rooms and a table of event handlers.
//! Handlers are looked up by event name each time an event arrives, so
//! swapping one is visible to the next event without touching the socket.

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use shared::{OrderEvent, Room};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use uuid::Uuid;

use super::channel::RealtimeChannel;

pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;
pub type ReconnectHook = Arc<dyn Fn() + Send + Sync>;

/// Event name -> handler, built before subscribing
#[derive(Clone, Default)]
pub struct Handlers {
    table: HashMap<String, EventHandler>,
}

impl std::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.table.keys()).finish()
    }
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, event: OrderEvent, handler: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_named(event.name(), handler)
    }

    pub fn on_named(
        mut self,
        name: impl Into<String>,
        handler: impl Fn(&Value) + Send + Sync + 'static,
    ) -> Self {
        self.table.insert(name.into(), Arc::new(handler));
        self
    }

    /// One handler for several events
    pub fn on_each(
        mut self,
        events: &[OrderEvent],
        handler: impl Fn(&Value) + Send + Sync + 'static,
    ) -> Self {
        let handler: EventHandler = Arc::new(handler);
        for event in events {
            self.table.insert(event.name().to_string(), handler.clone());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Registry-side state of one subscription
#[derive(Default)]
pub(crate) struct SubscriptionEntry {
    pub(crate) rooms: Mutex<BTreeSet<Room>>,
    handlers: RwLock<HashMap<String, EventHandler>>,
    on_reconnect: RwLock<Option<ReconnectHook>>,
}

impl SubscriptionEntry {
    pub(crate) fn new(rooms: BTreeSet<Room>, handlers: Handlers) -> Self {
        Self {
            rooms: Mutex::new(rooms),
            handlers: RwLock::new(handlers.table),
            on_reconnect: RwLock::new(None),
        }
    }

    pub(crate) fn handler(&self, event: &str) -> Option<EventHandler> {
        self.handlers.read().get(event).cloned()
    }

    pub(crate) fn reconnect_hook(&self) -> Option<ReconnectHook> {
        self.on_reconnect.read().clone()
    }
}

/// Live room membership plus handlers; dropping it unsubscribes
pub struct Subscription {
    id: Uuid,
    entry: Arc<SubscriptionEntry>,
    channel: RealtimeChannel,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("rooms", &*self.entry.rooms.lock())
            .finish()
    }
}

impl Subscription {
    pub(crate) fn new(id: Uuid, entry: Arc<SubscriptionEntry>, channel: RealtimeChannel) -> Self {
        Self { id, entry, channel }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn rooms(&self) -> Vec<Room> {
        self.entry.rooms.lock().iter().cloned().collect()
    }

    /// Replace the room list; only the difference reaches the server
    pub fn set_rooms(&self, rooms: impl IntoIterator<Item = Room>) {
        let next: BTreeSet<Room> = rooms.into_iter().collect();
        let (added, removed) = {
            let mut current = self.entry.rooms.lock();
            let added: Vec<Room> = next.difference(&current).cloned().collect();
            let removed: Vec<Room> = current.difference(&next).cloned().collect();
            *current = next;
            (added, removed)
        };
        self.channel.acquire_rooms(added);
        self.channel.release_rooms(removed);
    }

    /// Install or replace the handler for one event
    pub fn set_handler(&self, name: impl Into<String>, handler: impl Fn(&Value) + Send + Sync + 'static) {
        self.entry
            .handlers
            .write()
            .insert(name.into(), Arc::new(handler));
    }

    pub fn remove_handler(&self, name: &str) {
        self.entry.handlers.write().remove(name);
    }

    /// Run after every reconnect, once rooms have been rejoined
    pub fn on_reconnect(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.entry.on_reconnect.write() = Some(Arc::new(hook));
    }

    /// Leave the rooms this subscription alone held and drop its handlers
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.channel.remove_subscription(&self.id);
        let rooms: Vec<Room> = std::mem::take(&mut *self.entry.rooms.lock())
            .into_iter()
            .collect();
        self.channel.release_rooms(rooms);
    }
}
