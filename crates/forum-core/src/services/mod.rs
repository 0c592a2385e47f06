//! Application services - the use cases, written against the ports only.
//!
//! Every operation that needs an identity takes it as an explicit
//! `Option<&Principal>` resolved by the caller from the session.

mod auth;
mod comments;
mod likes;
mod posts;

pub use auth::{AuthService, Credentials, DUPLICATE_ACCOUNT, Registration, Session};
pub use comments::CommentService;
pub use likes::{LikeService, LikeSummary};
pub use posts::{MAX_PAGE_SIZE, MAX_TITLE_LEN, PostService};

use uuid::Uuid;

use crate::domain::Principal;
use crate::error::{DomainError, RepoError};

/// Unwrap the caller's principal or fail with `Unauthorized`.
pub(crate) fn require_principal(principal: Option<&Principal>) -> Result<&Principal, DomainError> {
    principal.ok_or(DomainError::Unauthorized)
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Error mapper for inserts that reference `entity_type`: a parent deleted
/// after it was checked surfaces as that parent not being found.
pub(crate) fn missing_parent(
    entity_type: &'static str,
    id: Uuid,
) -> impl FnOnce(RepoError) -> DomainError {
    move |err| match err {
        RepoError::NotFound => DomainError::not_found(entity_type, id),
        other => other.into(),
    }
}
