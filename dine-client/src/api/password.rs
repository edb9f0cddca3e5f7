//! `/password` endpoints

use shared::client::{ChangePasswordRequest, ForgotPasswordRequest, ResetPasswordRequest};
use validator::Validate;

use super::resource;
use crate::error::ClientResult;
use crate::http::{HttpRequest, Method};

resource!(PasswordApi);

impl PasswordApi {
    pub async fn forgot(&self, request: &ForgotPasswordRequest) -> ClientResult<()> {
        request.validate()?;
        self.client
            .send_unit(HttpRequest::new(Method::Post, "/password/forgot-password").with_json(request)?)
            .await
    }

    pub async fn reset(&self, request: &ResetPasswordRequest) -> ClientResult<()> {
        request.validate()?;
        self.client
            .send_unit(HttpRequest::new(Method::Post, "/password/reset-password").with_json(request)?)
            .await
    }

    pub async fn change(&self, request: &ChangePasswordRequest) -> ClientResult<()> {
        request.validate()?;
        self.client
            .send_unit(HttpRequest::new(Method::Post, "/password/change-password").with_json(request)?)
            .await
    }
}
