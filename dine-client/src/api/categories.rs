//! `/categories` endpoints

use shared::models::{Category, CategoryUpsert};
use shared::{ListQuery, Page};
use validator::Validate;

use super::resource;
use crate::error::ClientResult;

resource!(CategoriesApi);

impl CategoriesApi {
    pub async fn list(&self, query: &ListQuery) -> ClientResult<Page<Category>> {
        self.client.get_page("/categories", query).await
    }

    pub async fn get(&self, category_id: &str) -> ClientResult<Category> {
        self.client
            .get(&format!("/categories/{category_id}"))
            .await
    }

    pub async fn create(&self, category: &CategoryUpsert) -> ClientResult<Category> {
        category.validate()?;
        self.client.post("/categories", category).await
    }

    pub async fn update(
        &self,
        category_id: &str,
        category: &CategoryUpsert,
    ) -> ClientResult<Category> {
        category.validate()?;
        self.client
            .put(&format!("/categories/{category_id}"), category)
            .await
    }

    pub async fn delete(&self, category_id: &str) -> ClientResult<()> {
        self.client
            .delete(&format!("/categories/{category_id}"))
            .await
    }
}
