//! `/users` endpoints

use shared::models::{User, UserStatus, UserStatusUpdate, UserUpsert};
use shared::{ListQuery, Page};
use validator::Validate;

use super::resource;
use crate::error::ClientResult;

resource!(UsersApi);

impl UsersApi {
    pub async fn list(&self, query: &ListQuery) -> ClientResult<Page<User>> {
        self.client.get_page("/users", query).await
    }

    pub async fn get(&self, user_id: &str) -> ClientResult<User> {
        self.client.get(&format!("/users/{user_id}")).await
    }

    pub async fn create(&self, user: &UserUpsert) -> ClientResult<User> {
        user.validate()?;
        self.client.post("/users", user).await
    }

    pub async fn update(&self, user_id: &str, user: &UserUpsert) -> ClientResult<User> {
        user.validate()?;
        self.client.put(&format!("/users/{user_id}"), user).await
    }

    pub async fn delete(&self, user_id: &str) -> ClientResult<()> {
        self.client.delete(&format!("/users/{user_id}")).await
    }

    pub async fn profile(&self) -> ClientResult<User> {
        self.client.get("/users/profile").await
    }

    pub async fn update_profile(&self, user: &UserUpsert) -> ClientResult<User> {
        user.validate()?;
        self.client.put("/users/profile", user).await
    }

    pub async fn set_status(&self, user_id: &str, status: UserStatus) -> ClientResult<User> {
        self.client
            .patch(
                &format!("/users/{user_id}/status"),
                &UserStatusUpdate { status },
            )
            .await
    }

    pub async fn by_role(&self, role_id: &str) -> ClientResult<Vec<User>> {
        self.client.get(&format!("/users/role/{role_id}")).await
    }
}
