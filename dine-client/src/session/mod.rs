//! Session and identity
//!
//! [`SessionGate`] verifies the session once at startup, tracks the signed-in
//! user, and answers per-view access checks. The HTTP layer reports expired
//! sessions; the gate reacts by signing out locally.

pub mod access;
pub mod gate;
pub mod identity_cache;

pub use access::{Access, StaffView};
pub use gate::SessionGate;
pub use identity_cache::{CachedIdentity, IdentityCache};

use shared::models::User;

/// Observable session snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    /// True until the startup verification settles
    pub is_loading: bool,
    pub must_change_password: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            is_loading: true,
            must_change_password: false,
        }
    }
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}
