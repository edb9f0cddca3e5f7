//! Dine client library
//!
//! Keeps staff and customer views of the restaurant's orders in sync with
//! the backend:
//!
//! - [`ApiClient`]: REST calls with envelope unwrapping and single-flight
//!   session refresh
//! - [`RealtimeChannel`]: Socket.IO room subscriptions with rejoin on reconnect
//! - [`Poller`]: fixed-interval re-fetch
//! - [`views`]: kitchen queue, table tracker, dashboard strip and friends
//! - [`SessionGate`]: current user and per-view access
//! - [`Cart`]: customer-side order composition

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod http;
pub mod poller;
pub mod realtime;
pub mod session;
pub mod views;

// Re-exports
pub use cart::{Cart, CartLine, CartTable};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ErrorKind};
pub use http::{ApiClient, AuthEvent, HttpRequest, HttpResponse, HttpTransport, Method};
pub use poller::{PollState, Poller, RefreshTrigger};
pub use realtime::{
    Backoff, ConnectionState, Handlers, RealtimeChannel, SocketConnection, SocketConnector,
    Subscription,
};
pub use session::{Access, SessionGate, SessionState, StaffView};
pub use views::ViewState;
