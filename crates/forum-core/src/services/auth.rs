//! Signup, login, logout and current-user lookup.

use std::sync::Arc;

use crate::domain::{Principal, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{
    AuthError, AuthenticationManager, PasswordService, SessionId, SessionStore, UserRepository,
};

use super::require_principal;

/// Message returned when signup collides with an existing account.
pub const DUPLICATE_ACCOUNT: &str = "Username or email already taken.";

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 32;
const PASSWORD_MIN: usize = 8;

/// Username/password pair submitted at login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Account details submitted at signup.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    fn validate(&self) -> Result<(), DomainError> {
        let name_len = self.username.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&name_len) {
            return Err(DomainError::Validation(format!(
                "Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
            )));
        }
        if !self
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(DomainError::Validation(
                "Username may only contain letters, digits, '_' and '-'".to_string(),
            ));
        }

        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(DomainError::Validation("Invalid email address".to_string())),
        }

        if self.password.len() < PASSWORD_MIN {
            return Err(DomainError::Validation(format!(
                "Password must be at least {PASSWORD_MIN} characters"
            )));
        }
        Ok(())
    }
}

/// An authenticated session handed back to the caller after login.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub principal: Principal,
}

/// Account and session use cases.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    authenticator: Arc<dyn AuthenticationManager>,
    sessions: Arc<dyn SessionStore>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        authenticator: Arc<dyn AuthenticationManager>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            users,
            passwords,
            authenticator,
            sessions,
        }
    }

    /// Verify credentials and open a session for the resulting principal.
    ///
    /// A session the caller already holds is invalidated first so the
    /// authenticated session always gets a fresh id.
    pub async fn login(
        &self,
        credentials: Credentials,
        current: Option<&SessionId>,
    ) -> Result<Session, DomainError> {
        let principal = self
            .authenticator
            .authenticate(&credentials.username, &credentials.password)
            .await
            .map_err(|e| {
                if matches!(e, AuthError::InvalidCredentials) {
                    tracing::info!(username = %credentials.username, "Login rejected");
                }
                DomainError::from(e)
            })?;

        if let Some(previous) = current {
            self.sessions.invalidate(previous).await?;
        }
        let id = self.sessions.create(&principal).await?;

        tracing::info!(user_id = %principal.user_id, "User logged in");
        Ok(Session { id, principal })
    }

    /// Register a new account with a hashed password.
    pub async fn signup(&self, registration: Registration) -> Result<User, DomainError> {
        registration.validate()?;
        let email = registration.email.trim().to_lowercase();

        if self.users.exists_by_username(&registration.username).await?
            || self.users.exists_by_email(&email).await?
        {
            return Err(DomainError::Duplicate(DUPLICATE_ACCOUNT.to_string()));
        }

        let password_hash = self.passwords.hash(&registration.password)?;
        let user = User::new(registration.username, email, password_hash);

        let saved = self.users.save(user).await.map_err(|e| match e {
            RepoError::Constraint(_) => DomainError::Duplicate(DUPLICATE_ACCOUNT.to_string()),
            other => other.into(),
        })?;

        tracing::info!(user_id = %saved.id, username = %saved.username, "User created");
        Ok(saved)
    }

    /// The full user record behind the caller's principal.
    pub async fn current_user(&self, principal: Option<&Principal>) -> Result<User, DomainError> {
        let principal = require_principal(principal)?;

        self.users
            .find_by_username(&principal.username)
            .await?
            .ok_or_else(|| DomainError::not_found("User", &principal.username))
    }

    /// The caller's principal as stored in the session.
    pub fn current_principal(&self, principal: Option<&Principal>) -> Result<Principal, DomainError> {
        require_principal(principal).cloned()
    }

    /// Invalidate the caller's session, if any.
    pub async fn logout(&self, session: Option<&SessionId>) -> Result<(), DomainError> {
        if let Some(id) = session {
            self.sessions.invalidate(id).await?;
            tracing::info!("Session invalidated");
        }
        Ok(())
    }
}
