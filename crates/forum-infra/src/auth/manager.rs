//! Username/password authentication against the user repository.

use std::sync::Arc;

use async_trait::async_trait;

use forum_core::domain::Principal;
use forum_core::ports::{AuthError, AuthenticationManager, PasswordService, UserRepository};

/// Looks the user up by username and checks the password hash.
///
/// Unknown users and wrong passwords fail identically.
pub struct RepositoryAuthenticationManager {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl RepositoryAuthenticationManager {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }
}

#[async_trait]
impl AuthenticationManager for RepositoryAuthenticationManager {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.passwords.verify(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Principal::from(&user))
    }
}
