//! Auth-related types shared by the client and its tests
//!
//! Request/response bodies of the `/auth` and `/password` endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::User;

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    #[serde(default)]
    pub must_change_password: bool,
    /// Short-lived token used as a header fallback next to the session cookie
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// `GET /auth/verify` answers either `{ user }` or the user itself
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerifyResponse {
    Wrapped { user: User },
    Bare(User),
}

impl VerifyResponse {
    pub fn into_user(self) -> User {
        match self {
            VerifyResponse::Wrapped { user } | VerifyResponse::Bare(user) => user,
        }
    }
}

/// `POST /auth/refresh-token` response data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

// =============================================================================
// Password API DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_accepts_both_shapes() {
        let user = r#"{"_id":"u1","firstName":"Asha","lastName":"Rai","email":"asha@example.com","role":{"_id":"r1","name":"chef"}}"#;
        let wrapped: VerifyResponse =
            serde_json::from_str(&format!(r#"{{"user":{user}}}"#)).unwrap();
        let bare: VerifyResponse = serde_json::from_str(user).unwrap();
        assert_eq!(wrapped.into_user().id, "u1");
        let bare = bare.into_user();
        assert_eq!(bare.role_name(), Some(crate::models::RoleName::Chef));
    }

    #[test]
    fn test_login_request_validation() {
        let bad = LoginRequest {
            email: "not-an-email".into(),
            password: "x".into(),
        };
        assert!(bad.validate().is_err());
    }
}
