//! Authentication ports.

use async_trait::async_trait;

use crate::domain::Principal;
use crate::error::RepoError;

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Verifies a username/password pair and produces the authenticated principal.
#[async_trait]
pub trait AuthenticationManager: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error(transparent)]
    Repository(#[from] RepoError),
}
