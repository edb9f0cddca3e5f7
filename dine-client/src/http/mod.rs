//! HTTP client layer
//!
//! [`ApiClient`] attaches credentials (the transport's cookie store plus an
//! optional bearer token), unwraps the response envelope, and recovers from
//! an expired session with a single-flight refresh before any caller sees
//! the 401.

pub mod refresh;
pub mod transport;

pub use refresh::{RefreshFailure, RefreshOutcome, SingleFlight};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::client::RefreshResponse;
use shared::{ApiEnvelope, Page};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Endpoints whose 401 is an answer, not an expired session
const AUTH_PATHS: [&str; 3] = ["/auth/login", "/auth/refresh-token", "/auth/verify"];

const REFRESH_PATH: &str = "/auth/refresh-token";

/// Session-level notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A refresh succeeded
    Refreshed,
    /// A refresh failed; the access token has been cleared
    SessionExpired { reason: String },
}

struct ApiInner {
    transport: Arc<dyn HttpTransport>,
    access_token: RwLock<Option<String>>,
    refresh: Arc<SingleFlight>,
    auth_events: broadcast::Sender<AuthEvent>,
}

/// Shared REST client; clones share token, refresh state and transport
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiInner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("has_token", &self.inner.access_token.read().is_some())
            .finish()
    }
}

impl ApiClient {
    /// Create a network client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let transport = ReqwestTransport::new(config)?;
        let client = Self::with_transport(Arc::new(transport));
        client.set_access_token(config.access_token.clone());
        Ok(client)
    }

    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        let (auth_events, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(ApiInner {
                transport,
                access_token: RwLock::new(None),
                refresh: Arc::new(SingleFlight::new()),
                auth_events,
            }),
        }
    }

    // ========== Credentials ==========

    pub fn set_access_token(&self, token: Option<String>) {
        *self.inner.access_token.write() = token;
    }

    pub fn clear_access_token(&self) {
        self.set_access_token(None);
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.access_token.read().clone()
    }

    pub fn subscribe_auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.auth_events.subscribe()
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    // ========== Verbs ==========

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.data(HttpRequest::new(Method::Get, path)).await
    }

    pub async fn get_with<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        self.data(HttpRequest::new(Method::Get, path).with_query(query)?)
            .await
    }

    /// GET a list endpoint, keeping the pagination block
    pub async fn get_page<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<Page<T>> {
        let envelope: ApiEnvelope<Vec<T>> = self
            .envelope(HttpRequest::new(Method::Get, path).with_query(query)?)
            .await?;
        Ok(Page::new(
            envelope.data.unwrap_or_default(),
            envelope.pagination,
        ))
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.data(HttpRequest::new(Method::Post, path).with_json(body)?)
            .await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.data(HttpRequest::new(Method::Post, path)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.data(HttpRequest::new(Method::Put, path).with_json(body)?)
            .await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.data(HttpRequest::new(Method::Patch, path).with_json(body)?)
            .await
    }

    pub async fn patch_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.data(HttpRequest::new(Method::Patch, path)).await
    }

    /// DELETE; the response data, if any, is discarded
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send_unit(HttpRequest::new(Method::Delete, path)).await
    }

    /// Send and only check for success
    pub async fn send_unit(&self, request: HttpRequest) -> ClientResult<()> {
        self.envelope::<serde_json::Value>(request).await.map(|_| ())
    }

    // ========== Core ==========

    /// Send, then unwrap the envelope's `data`
    pub async fn data<T: DeserializeOwned>(&self, request: HttpRequest) -> ClientResult<T> {
        let path = request.path.clone();
        self.envelope::<T>(request).await?.data.ok_or_else(|| {
            ClientError::InvalidResponse(format!("missing data in response to {path}"))
        })
    }

    /// Send and decode the full envelope
    pub async fn envelope<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> ClientResult<ApiEnvelope<T>> {
        let response = self.execute(request).await?;
        decode_envelope(response)
    }

    /// Send with credentials; on a 401 from a non-auth endpoint, wait for the
    /// single-flight refresh and retry once
    pub async fn execute(&self, mut request: HttpRequest) -> ClientResult<HttpResponse> {
        let generation = self.inner.refresh.generation();
        request.bearer = self.access_token();
        let response = self.inner.transport.send(request.clone()).await?;

        if response.status != 401 || is_auth_path(&request.path) {
            return Ok(response);
        }

        tracing::debug!(path = %request.path, "401 received, awaiting session refresh");
        let client = self.clone();
        self.inner
            .refresh
            .run(generation, move || async move { client.refresh_session().await })
            .await
            .map_err(|failure| ClientError::SessionExpired(failure.to_string()))?;

        request.bearer = self.access_token();
        self.inner.transport.send(request).await
    }

    /// The refresh itself; runs at most once at a time via [`SingleFlight`]
    async fn refresh_session(&self) -> RefreshOutcome {
        tracing::info!("Refreshing session");
        let request = HttpRequest::new(Method::Post, REFRESH_PATH)
            .with_json(&serde_json::json!({}))
            .map_err(|e| RefreshFailure::new(None, e.to_string()))?;

        let result = match self.inner.transport.send(request).await {
            Ok(response) => decode_envelope::<RefreshResponse>(response)
                .map_err(|e| RefreshFailure::new(status_of(&e), e.to_string())),
            Err(e) => Err(RefreshFailure::new(None, e.to_string())),
        };

        match result {
            Ok(envelope) => {
                if let Some(token) = envelope.data.and_then(|d| d.access_token) {
                    self.set_access_token(Some(token));
                }
                tracing::info!("Session refreshed");
                let _ = self.inner.auth_events.send(AuthEvent::Refreshed);
                Ok(())
            }
            Err(failure) => {
                tracing::warn!(reason = %failure, "Session refresh failed, clearing credentials");
                self.clear_access_token();
                let _ = self.inner.auth_events.send(AuthEvent::SessionExpired {
                    reason: failure.to_string(),
                });
                Err(failure)
            }
        }
    }
}

fn is_auth_path(path: &str) -> bool {
    AUTH_PATHS.iter().any(|p| path.starts_with(p))
}

fn status_of(error: &ClientError) -> Option<u16> {
    match error {
        ClientError::Unauthorized => Some(401),
        ClientError::Forbidden(_) => Some(403),
        ClientError::NotFound(_) => Some(404),
        ClientError::Server { status, .. } => Some(*status),
        _ => None,
    }
}

/// Map a raw response to its envelope or a classified error
pub fn decode_envelope<T: DeserializeOwned>(response: HttpResponse) -> ClientResult<ApiEnvelope<T>> {
    if !response.is_success() {
        let message = error_message(&response.body);
        return Err(ClientError::from_status(response.status, message));
    }

    let envelope: ApiEnvelope<T> = serde_json::from_slice(&response.body)
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
    if !envelope.success {
        return Err(ClientError::Validation(
            envelope
                .message
                .unwrap_or_else(|| "request was not successful".into()),
        ));
    }
    Ok(envelope)
}

/// The server's `message`, else the raw text, else a generic fallback
fn error_message(body: &[u8]) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    if let Ok(ErrorBody {
        message: Some(message),
    }) = serde_json::from_slice::<ErrorBody>(body)
    {
        return message;
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        "Something went wrong".to_string()
    } else {
        text
    }
}
