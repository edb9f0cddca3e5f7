//! Role Model

use serde::{Deserialize, Serialize};

use super::{Identified, string_enum};

/// The closed set of role names the views are gated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleName {
    Admin,
    Manager,
    Waiter,
    Chef,
    KitchenStaff,
}

string_enum!(RoleName, "role", {
    Admin => "admin",
    Manager => "manager",
    Waiter => "waiter",
    Chef => "chef",
    KitchenStaff => "kitchen_staff",
});

/// Role reference as embedded in a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

impl RoleSummary {
    /// `None` for custom roles outside the gated set
    pub fn role_name(&self) -> Option<RoleName> {
        self.name.parse().ok()
    }
}

impl Identified for RoleSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Role entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Identified for Role {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Create or patch a role
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleUpsert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}
