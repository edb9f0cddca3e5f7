//! Shared types for the dine workspace
//!
//! Wire and domain types exchanged with the restaurant backend: orders and
//! their items, tables, menu, payments, users, the response envelope and
//! pagination structures, and the realtime event vocabulary.
//! Nothing in this crate performs I/O.

pub mod client;
pub mod models;
pub mod realtime;
pub mod request;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{ItemStatus, Order, OrderItem, OrderStatus, Ref};
pub use realtime::{OrderEvent, OrderNotice, Room};
pub use request::ListQuery;
pub use response::{ApiEnvelope, Page, Pagination};
