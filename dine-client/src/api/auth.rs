//! `/auth` endpoints

use shared::client::{LoginRequest, LoginResponse, VerifyResponse};
use shared::models::User;
use validator::Validate;

use super::resource;
use crate::error::ClientResult;
use crate::http::{HttpRequest, Method};

resource!(
    /// Sign-in, identity check and sign-out
    AuthApi
);

impl AuthApi {
    /// Sign in; the session cookie lands in the transport's cookie store and
    /// the optional access token becomes the bearer fallback
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        request.validate()?;
        let response: LoginResponse = self.client.post("/auth/login", request).await?;
        if let Some(token) = &response.access_token {
            self.client.set_access_token(Some(token.clone()));
        }
        tracing::info!(user = %response.user.email, "Signed in");
        Ok(response)
    }

    /// Who the current credentials belong to
    pub async fn verify(&self) -> ClientResult<User> {
        let response: VerifyResponse = self.client.get("/auth/verify").await?;
        Ok(response.into_user())
    }

    /// Server-side sign-out; the local token is cleared whatever the outcome
    pub async fn logout(&self) -> ClientResult<()> {
        let result = self
            .client
            .send_unit(HttpRequest::new(Method::Post, "/auth/logout"))
            .await;
        self.client.clear_access_token();
        result
    }
}
