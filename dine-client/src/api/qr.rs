//! `/qr` endpoints: what a customer sees after scanning a table's code

use shared::models::qr::OrderingPage;

use super::resource;
use crate::error::ClientResult;

resource!(QrApi);

impl QrApi {
    pub async fn by_table_id(&self, table_id: &str) -> ClientResult<OrderingPage> {
        self.client
            .get(&format!("/qr/order/table/{table_id}"))
            .await
    }

    pub async fn by_table_number(&self, table_number: u32) -> ClientResult<OrderingPage> {
        self.client
            .get(&format!("/qr/order/table-number/{table_number}"))
            .await
    }
}
