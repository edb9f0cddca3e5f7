//! User Model

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Identified, Ref, RoleName, RoleSummary, string_enum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

string_enum!(UserStatus, "user", {
    Active => "Active",
    Inactive => "Inactive",
});

/// Staff user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Ref<RoleSummary>>,
    #[serde(default)]
    pub status: UserStatus,
}

impl User {
    /// Role name when the role came back populated
    pub fn role_name(&self) -> Option<RoleName> {
        self.role
            .as_ref()
            .and_then(|r| r.populated())
            .and_then(|r| r.role_name())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl Identified for User {
    fn id(&self) -> &str {
        &self.id
    }
}

/// User reference as embedded in tables and orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl Identified for UserSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Create or update a staff user (JSON form; avatar upload is not supported)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserUpsert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 6))]
    pub password: Option<String>,
    /// Role id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// `PATCH /users/:id/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatusUpdate {
    pub status: UserStatus,
}
