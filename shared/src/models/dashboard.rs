//! Dashboard Models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::string_enum;

/// Live operational counters from `GET /dashboard/real-time`
///
/// Every counter defaults to zero when the server leaves it out.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealTimeStats {
    pub active_orders: u64,
    pub pending_orders: u64,
    pub kitchen_queue: u64,
    pub available_tables: u64,
    pub occupied_tables: u64,
    /// Today's revenue
    pub total_revenue: Decimal,
    pub staff_on_duty: u64,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Reporting window for the analytics endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DashboardPeriod {
    #[default]
    Today,
    Yesterday,
    Week,
    Month,
    Year,
}

string_enum!(DashboardPeriod, "period", {
    Today => "today",
    Yesterday => "yesterday",
    Week => "week",
    Month => "month",
    Year => "year",
});

/// Query for overview/sales/operations/menu analytics
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PeriodQuery {
    pub period: DashboardPeriod,
}
