//! `/menu` endpoints

use shared::models::{Availability, AvailabilityUpdate, MenuItem, MenuItemUpsert};
use shared::{ListQuery, Page};
use validator::Validate;

use super::resource;
use crate::error::ClientResult;

resource!(MenuApi);

impl MenuApi {
    /// Public menu listing (filterable by category, search, availability)
    pub async fn list(&self, query: &ListQuery) -> ClientResult<Page<MenuItem>> {
        self.client.get_page("/menu/public", query).await
    }

    pub async fn by_category(&self, category_id: &str) -> ClientResult<Vec<MenuItem>> {
        self.client
            .get(&format!("/menu/public/category/{category_id}"))
            .await
    }

    pub async fn get(&self, item_id: &str) -> ClientResult<MenuItem> {
        self.client.get(&format!("/menu/public/{item_id}")).await
    }

    pub async fn create(&self, item: &MenuItemUpsert) -> ClientResult<MenuItem> {
        item.validate()?;
        self.client.post("/menu", item).await
    }

    pub async fn update(&self, item_id: &str, item: &MenuItemUpsert) -> ClientResult<MenuItem> {
        item.validate()?;
        self.client.put(&format!("/menu/{item_id}"), item).await
    }

    pub async fn delete(&self, item_id: &str) -> ClientResult<()> {
        self.client.delete(&format!("/menu/{item_id}")).await
    }

    pub async fn set_availability(
        &self,
        item_id: &str,
        availability_status: Availability,
    ) -> ClientResult<MenuItem> {
        self.client
            .patch(
                &format!("/menu/{item_id}/availability"),
                &AvailabilityUpdate {
                    availability_status,
                },
            )
            .await
    }
}
