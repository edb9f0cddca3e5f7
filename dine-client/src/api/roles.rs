//! `/roles` endpoints

use shared::models::{Role, RoleUpsert};

use super::resource;
use crate::error::{ClientError, ClientResult};

resource!(RolesApi);

impl RolesApi {
    pub async fn list(&self) -> ClientResult<Vec<Role>> {
        self.client.get("/roles").await
    }

    pub async fn get(&self, role_id: &str) -> ClientResult<Role> {
        self.client.get(&format!("/roles/{role_id}")).await
    }

    pub async fn create(&self, role: &RoleUpsert) -> ClientResult<Role> {
        if role.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            return Err(ClientError::Validation("role name is required".into()));
        }
        self.client.post("/roles", role).await
    }

    pub async fn update(&self, role_id: &str, role: &RoleUpsert) -> ClientResult<Role> {
        self.client.put(&format!("/roles/{role_id}"), role).await
    }

    pub async fn delete(&self, role_id: &str) -> ClientResult<()> {
        self.client.delete(&format!("/roles/{role_id}")).await
    }
}
