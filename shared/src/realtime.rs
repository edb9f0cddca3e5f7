//! Realtime vocabulary
//!
//! Event names pushed by the backend over the socket channel and the rooms a
//! client can join. Events are hints: they identify what changed, and
//! consumers refetch instead of applying them as deltas.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{Ref, TableSummary};

/// Order lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderEvent {
    #[serde(rename = "order:new")]
    New,
    #[serde(rename = "order:status-updated")]
    StatusUpdated,
    #[serde(rename = "order:item-updated")]
    ItemUpdated,
    #[serde(rename = "order:paid")]
    Paid,
    #[serde(rename = "order:cancelled")]
    Cancelled,
    #[serde(rename = "order:items-added")]
    ItemsAdded,
}

impl OrderEvent {
    pub const ALL: [OrderEvent; 6] = [
        OrderEvent::New,
        OrderEvent::StatusUpdated,
        OrderEvent::ItemUpdated,
        OrderEvent::Paid,
        OrderEvent::Cancelled,
        OrderEvent::ItemsAdded,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OrderEvent::New => "order:new",
            OrderEvent::StatusUpdated => "order:status-updated",
            OrderEvent::ItemUpdated => "order:item-updated",
            OrderEvent::Paid => "order:paid",
            OrderEvent::Cancelled => "order:cancelled",
            OrderEvent::ItemsAdded => "order:items-added",
        }
    }
}

impl TryFrom<&str> for OrderEvent {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        OrderEvent::ALL
            .into_iter()
            .find(|e| e.name() == value)
            .ok_or(())
    }
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named broadcast group
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Room {
    Kitchen,
    Dashboard,
    AdminAlerts,
    Order(String),
    Table(String),
}

impl Room {
    pub fn order(id: impl Into<String>) -> Self {
        Room::Order(id.into())
    }

    pub fn table(id: impl Into<String>) -> Self {
        Room::Table(id.into())
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::Kitchen => f.write_str("kitchen"),
            Room::Dashboard => f.write_str("dashboard"),
            Room::AdminAlerts => f.write_str("admin-alerts"),
            Room::Order(id) => write!(f, "order:{id}"),
            Room::Table(id) => write!(f, "table:{id}"),
        }
    }
}

impl FromStr for Room {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kitchen" => Ok(Room::Kitchen),
            "dashboard" => Ok(Room::Dashboard),
            "admin-alerts" => Ok(Room::AdminAlerts),
            _ => {
                if let Some(id) = s.strip_prefix("order:").filter(|id| !id.is_empty()) {
                    Ok(Room::Order(id.to_string()))
                } else if let Some(id) = s.strip_prefix("table:").filter(|id| !id.is_empty()) {
                    Ok(Room::Table(id.to_string()))
                } else {
                    Err(format!("unknown room: {s}"))
                }
            }
        }
    }
}

impl Serialize for Room {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Room {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Order snapshot some events embed; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoticeOrder {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub table: Option<Ref<TableSummary>>,
    pub customer_name: Option<String>,
    pub items: Vec<serde_json::Value>,
}

/// Identifying data carried by an order event payload
///
/// Enough to render a notification, never the authoritative state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderNotice {
    pub order_id: Option<String>,
    pub table_id: Option<String>,
    pub table_number: Option<u32>,
    pub item_id: Option<String>,
    pub item_count: Option<u32>,
    pub status: Option<String>,
    pub order: Option<NoticeOrder>,
}

impl OrderNotice {
    /// Lenient decode: unknown shapes yield an empty notice
    pub fn from_value(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    pub fn order_id(&self) -> Option<&str> {
        self.order_id
            .as_deref()
            .or_else(|| self.order.as_ref().and_then(|o| o.id.as_deref()))
    }

    /// Table number if known, else the raw table id, else `?`
    pub fn table_label(&self) -> String {
        let embedded = self
            .order
            .as_ref()
            .and_then(|o| o.table.as_ref())
            .and_then(|t| t.populated())
            .map(|t| t.table_number);
        match embedded.or(self.table_number) {
            Some(n) => n.to_string(),
            None => self.table_id.clone().unwrap_or_else(|| "?".to_string()),
        }
    }

    pub fn customer(&self) -> &str {
        self.order
            .as_ref()
            .and_then(|o| o.customer_name.as_deref())
            .unwrap_or("Customer")
    }

    pub fn item_count(&self) -> u32 {
        self.order
            .as_ref()
            .map(|o| o.items.len() as u32)
            .filter(|n| *n > 0)
            .or(self.item_count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_round_trip() {
        for e in OrderEvent::ALL {
            assert_eq!(OrderEvent::try_from(e.name()), Ok(e));
        }
        assert!(OrderEvent::try_from("order:eaten").is_err());
    }

    #[test]
    fn test_room_wire_names() {
        assert_eq!(Room::order("abc").to_string(), "order:abc");
        assert_eq!("table:t7".parse::<Room>(), Ok(Room::table("t7")));
        assert_eq!("admin-alerts".parse::<Room>(), Ok(Room::AdminAlerts));
        assert!("order:".parse::<Room>().is_err());
    }

    #[test]
    fn test_notice_reads_embedded_order() {
        let v = serde_json::json!({
            "order": {
                "_id": "o1",
                "table": {"_id": "t7", "tableNumber": 7},
                "customerName": "Asha",
                "items": [{}, {}]
            }
        });
        let n = OrderNotice::from_value(&v);
        assert_eq!(n.order_id(), Some("o1"));
        assert_eq!(n.table_label(), "7");
        assert_eq!(n.customer(), "Asha");
        assert_eq!(n.item_count(), 2);

        let empty = OrderNotice::from_value(&serde_json::json!("garbage"));
        assert_eq!(empty.table_label(), "?");
        assert_eq!(empty.customer(), "Customer");
    }
}
