//! `/dashboard` endpoints

use shared::models::{DashboardPeriod, PeriodQuery, RealTimeStats};

use super::resource;
use crate::error::ClientResult;

resource!(DashboardApi);

impl DashboardApi {
    /// Live counters behind the dashboard strip
    pub async fn real_time(&self) -> ClientResult<RealTimeStats> {
        self.client.get("/dashboard/real-time").await
    }

    pub async fn overview(&self, period: DashboardPeriod) -> ClientResult<serde_json::Value> {
        self.report("/dashboard/overview", period).await
    }

    pub async fn sales(&self, period: DashboardPeriod) -> ClientResult<serde_json::Value> {
        self.report("/dashboard/sales", period).await
    }

    pub async fn operations(&self, period: DashboardPeriod) -> ClientResult<serde_json::Value> {
        self.report("/dashboard/operations", period).await
    }

    pub async fn menu(&self, period: DashboardPeriod) -> ClientResult<serde_json::Value> {
        self.report("/dashboard/menu", period).await
    }

    async fn report(&self, path: &str, period: DashboardPeriod) -> ClientResult<serde_json::Value> {
        self.client.get_with(path, &PeriodQuery { period }).await
    }
}
