//! Server-side session port.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Principal;

/// Well-known prefix under which a session's security context is stored.
pub const SECURITY_CONTEXT_KEY: &str = "forum:security-context";

/// Opaque session identifier carried by the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps session ids to the principal that authenticated them.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Open a new session for `principal`.
    async fn create(&self, principal: &Principal) -> Result<SessionId, SessionError>;

    /// Resolve a session. Unknown or expired ids yield `None`.
    async fn load(&self, id: &SessionId) -> Result<Option<Principal>, SessionError>;

    /// Drop a session. Unknown ids are not an error.
    async fn invalidate(&self, id: &SessionId) -> Result<(), SessionError>;
}

/// Session store errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session backend error: {0}")]
    Backend(String),

    #[error("Corrupt session data: {0}")]
    Corrupt(String),
}
