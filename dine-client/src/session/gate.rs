//! Session gate

use shared::client::{LoginRequest, LoginResponse};
use shared::models::User;
use std::sync::{Arc, Weak};
use tokio::sync::{OnceCell, broadcast, watch};
use tokio_util::sync::CancellationToken;

use super::access::{self, Access, StaffView};
use super::identity_cache::{CachedIdentity, IdentityCache};
use super::SessionState;
use crate::error::ClientResult;
use crate::http::{ApiClient, AuthEvent};

struct GateInner {
    api: ApiClient,
    state: watch::Sender<SessionState>,
    cache: Option<IdentityCache>,
    verified: OnceCell<()>,
    shutdown: CancellationToken,
}

impl Drop for GateInner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Current user, loading flag, and view access; clones share state
#[derive(Clone)]
pub struct SessionGate {
    inner: Arc<GateInner>,
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

impl SessionGate {
    /// Create the gate and start listening for expired sessions; needs a tokio runtime
    pub fn new(api: ApiClient, cache: Option<IdentityCache>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        let gate = Self {
            inner: Arc::new(GateInner {
                api: api.clone(),
                state,
                cache,
                verified: OnceCell::new(),
                shutdown: CancellationToken::new(),
            }),
        };
        tokio::spawn(listen_for_expiry(
            Arc::downgrade(&gate.inner),
            api.subscribe_auth_events(),
            gate.inner.shutdown.clone(),
        ));
        gate
    }

    /// Verify the session with the backend; only the first call does any work
    pub async fn initialize(&self) -> SessionState {
        self.inner
            .verified
            .get_or_init(|| async {
                match self.inner.api.auth().verify().await {
                    Ok(user) => {
                        tracing::info!(user = %user.email, "Session verified");
                        self.remember(&user);
                        self.inner.state.send_modify(|s| {
                            s.user = Some(user);
                            s.is_loading = false;
                        });
                    }
                    Err(e) => {
                        tracing::info!("No valid session: {e}");
                        self.inner.state.send_modify(|s| {
                            s.user = None;
                            s.is_loading = false;
                        });
                    }
                }
            })
            .await;
        self.state()
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn user(&self) -> Option<User> {
        self.inner.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn access(&self, view: StaffView) -> Access {
        access::check(&self.inner.state.borrow(), view)
    }

    /// Last signed-in user from the soft cache; display only
    pub fn cached_identity(&self) -> Option<CachedIdentity> {
        self.inner.cache.as_ref().and_then(IdentityCache::load)
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response = self.inner.api.auth().login(&request).await?;
        self.remember(&response.user);
        let user = response.user.clone();
        let must_change_password = response.must_change_password;
        self.inner.state.send_modify(|s| {
            s.user = Some(user);
            s.is_loading = false;
            s.must_change_password = must_change_password;
        });
        Ok(response)
    }

    /// Sign out; server errors are logged and otherwise ignored
    pub async fn logout(&self) {
        if let Err(e) = self.inner.api.auth().logout().await {
            tracing::warn!("Server logout failed, clearing local session anyway: {e}");
        }
        self.inner.clear_session();
        tracing::info!("Signed out");
    }

    /// Replace the user after a profile edit
    pub fn set_user(&self, user: User) {
        self.remember(&user);
        self.inner.state.send_modify(|s| s.user = Some(user));
    }

    pub fn set_must_change_password(&self, value: bool) {
        self.inner
            .state
            .send_modify(|s| s.must_change_password = value);
    }

    fn remember(&self, user: &User) {
        if let Some(cache) = &self.inner.cache
            && let Err(e) = cache.store(user)
        {
            tracing::warn!("Failed to cache identity: {e}");
        }
    }
}

impl GateInner {
    fn clear_session(&self) {
        self.api.clear_access_token();
        self.state.send_modify(|s| {
            s.user = None;
            s.is_loading = false;
            s.must_change_password = false;
        });
        if let Some(cache) = &self.cache
            && let Err(e) = cache.clear()
        {
            tracing::warn!("Failed to clear identity cache: {e}");
        }
    }
}

async fn listen_for_expiry(
    gate: Weak<GateInner>,
    mut events: broadcast::Receiver<AuthEvent>,
    shutdown: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = shutdown.cancelled() => return,
            event = events.recv() => event,
        };
        match event {
            Ok(AuthEvent::SessionExpired { reason }) => {
                let Some(gate) = gate.upgrade() else { return };
                tracing::warn!(%reason, "Session expired, signing out");
                gate.clear_session();
            }
            Ok(AuthEvent::Refreshed) => {}
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::debug!("Auth event listener lagged {n} events");
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}
