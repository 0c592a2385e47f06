//! Session store on top of any [`Cache`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use forum_core::domain::Principal;
use forum_core::ports::{Cache, SECURITY_CONTEXT_KEY, SessionError, SessionId, SessionStore};

/// Stores each session's principal as JSON under
/// `forum:security-context:<session id>`.
///
/// Expiry is sliding: every successful load pushes it out by `ttl` again.
/// The refresh never recreates an entry, so a load racing with
/// [`SessionStore::invalidate`] cannot bring the session back.
pub struct CacheSessionStore {
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl CacheSessionStore {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    fn key(id: &SessionId) -> String {
        format!("{SECURITY_CONTEXT_KEY}:{id}")
    }
}

#[async_trait]
impl SessionStore for CacheSessionStore {
    async fn create(&self, principal: &Principal) -> Result<SessionId, SessionError> {
        let id = SessionId::generate();
        let payload =
            serde_json::to_string(principal).map_err(|e| SessionError::Corrupt(e.to_string()))?;

        self.cache
            .set(&Self::key(&id), &payload, Some(self.ttl))
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))?;

        tracing::debug!(user_id = %principal.user_id, "Session created");
        Ok(id)
    }

    async fn load(&self, id: &SessionId) -> Result<Option<Principal>, SessionError> {
        let key = Self::key(id);
        let Some(payload) = self.cache.get(&key).await else {
            return Ok(None);
        };

        let principal = match serde_json::from_str::<Principal>(&payload) {
            Ok(principal) => principal,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable session");
                self.cache
                    .delete(&key)
                    .await
                    .map_err(|e| SessionError::Backend(e.to_string()))?;
                return Ok(None);
            }
        };

        let live = self
            .cache
            .touch(&key, self.ttl)
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))?;
        if !live {
            return Ok(None);
        }

        Ok(Some(principal))
    }

    async fn invalidate(&self, id: &SessionId) -> Result<(), SessionError> {
        self.cache
            .delete(&Self::key(id))
            .await
            .map_err(|e| SessionError::Backend(e.to_string()))
    }
}
