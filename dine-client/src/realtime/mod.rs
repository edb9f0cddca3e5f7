//! Realtime notifications over Socket.IO
//!
//! Events are hints: consumers react by refetching, never by patching
//! local state from the payload.

pub mod channel;
pub mod codec;
pub mod connector;
pub mod subscription;

pub use channel::{Backoff, ConnectionState, RealtimeChannel};
pub use connector::{FrameSink, FrameStream, SocketConnection, SocketConnector, TungsteniteConnector};
pub use subscription::{EventHandler, Handlers, ReconnectHook, Subscription};
