//! `/tables` endpoints

use shared::models::{AssignOrder, DiningTable, TableStatus, TableStatusUpdate, TableUpsert};
use shared::{ListQuery, Page};
use validator::Validate;

use super::resource;
use crate::error::ClientResult;

resource!(TablesApi);

impl TablesApi {
    pub async fn list(&self, query: &ListQuery) -> ClientResult<Page<DiningTable>> {
        self.client.get_page("/tables", query).await
    }

    pub async fn get(&self, table_id: &str) -> ClientResult<DiningTable> {
        self.client.get(&format!("/tables/{table_id}")).await
    }

    pub async fn create(&self, table: &TableUpsert) -> ClientResult<DiningTable> {
        table.validate()?;
        self.client.post("/tables", table).await
    }

    pub async fn update(&self, table_id: &str, table: &TableUpsert) -> ClientResult<DiningTable> {
        table.validate()?;
        self.client.put(&format!("/tables/{table_id}"), table).await
    }

    pub async fn delete(&self, table_id: &str) -> ClientResult<()> {
        self.client.delete(&format!("/tables/{table_id}")).await
    }

    pub async fn update_status(
        &self,
        table_id: &str,
        status: TableStatus,
    ) -> ClientResult<DiningTable> {
        self.client
            .patch(
                &format!("/tables/{table_id}/status"),
                &TableStatusUpdate { status },
            )
            .await
    }

    /// Free the table once its guests have left
    pub async fn clear(&self, table_id: &str) -> ClientResult<DiningTable> {
        self.client
            .patch_empty(&format!("/tables/{table_id}/clear"))
            .await
    }

    pub async fn assign_order(&self, table_id: &str, order_id: &str) -> ClientResult<DiningTable> {
        self.client
            .post(
                "/tables/assign-order",
                &AssignOrder {
                    table_id: table_id.to_string(),
                    order_id: order_id.to_string(),
                },
            )
            .await
    }

    pub async fn public_by_id(&self, table_id: &str) -> ClientResult<DiningTable> {
        self.client
            .get(&format!("/tables/public/{table_id}"))
            .await
    }

    pub async fn public_by_number(&self, table_number: u32) -> ClientResult<DiningTable> {
        self.client
            .get(&format!("/tables/public/number/{table_number}"))
            .await
    }
}
