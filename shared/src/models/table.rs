//! Dining Table Model

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Identified, Ref, UserSummary, string_enum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
    Cleaning,
}

string_enum!(TableStatus, "table", {
    Available => "Available",
    Occupied => "Occupied",
    Reserved => "Reserved",
    Cleaning => "Cleaning",
});

/// Dining table entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    #[serde(rename = "_id")]
    pub id: String,
    pub table_number: u32,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub status: TableStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_waiter: Option<Ref<UserSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

impl DiningTable {
    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assigned_waiter
            .as_ref()
            .is_some_and(|w| w.id() == user_id)
    }
}

impl Identified for DiningTable {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Table reference as embedded in orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub table_number: u32,
}

impl Identified for TableSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Create or replace a table
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TableUpsert {
    #[validate(range(min = 1))]
    pub table_number: u32,
    #[validate(range(min = 1, message = "capacity must be at least 1"))]
    pub capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_waiter: Option<String>,
}

/// `PATCH /tables/:id/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatusUpdate {
    pub status: TableStatus,
}

/// `POST /tables/assign-order`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignOrder {
    pub table_id: String,
    pub order_id: String,
}
