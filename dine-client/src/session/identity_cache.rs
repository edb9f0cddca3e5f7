//! Soft identity cache
//!
//! Remembers who was last signed in so a consumer can show a name while the
//! session is being verified. The cached user never grants access; only a
//! verified session does.

use chrono::{DateTime, Utc};
use shared::models::User;
use std::path::{Path, PathBuf};

use crate::error::ClientResult;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CachedIdentity {
    pub user: User,
    pub cached_at: DateTime<Utc>,
}

/// JSON file holding the last signed-in user
#[derive(Debug, Clone)]
pub struct IdentityCache {
    file_path: PathBuf,
}

impl IdentityCache {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// `None` when nothing is cached; a corrupt file counts as nothing
    pub fn load(&self) -> Option<CachedIdentity> {
        let content = std::fs::read_to_string(&self.file_path).ok()?;
        match serde_json::from_str(&content) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::warn!(path = %self.file_path.display(), "Ignoring unreadable identity cache: {e}");
                None
            }
        }
    }

    pub fn store(&self, user: &User) -> ClientResult<()> {
        if let Some(parent) = self.file_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let identity = CachedIdentity {
            user: user.clone(),
            cached_at: Utc::now(),
        };
        std::fs::write(&self.file_path, serde_json::to_string_pretty(&identity)?)?;
        tracing::debug!(user = %user.email, "Identity cached");
        Ok(())
    }

    pub fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.file_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_user() -> User {
        serde_json::from_value(json!({
            "_id": "u1",
            "firstName": "Asha",
            "lastName": "Rai",
            "email": "asha@example.com",
            "role": {"_id": "r1", "name": "waiter"},
            "status": "Active"
        }))
        .unwrap()
    }

    #[test]
    fn test_store_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = IdentityCache::new(dir.path().join("auth/identity.json"));
        assert!(cache.load().is_none());

        cache.store(&sample_user()).unwrap();
        let cached = cache.load().unwrap();
        assert_eq!(cached.user.email, "asha@example.com");

        cache.clear().unwrap();
        assert!(cache.load().is_none());
        // clearing twice is fine
        cache.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identity.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(IdentityCache::new(path).load().is_none());
    }
}
