use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Like, Principal};
use crate::error::{DomainError, RepoError};
use crate::ports::{LikeRepository, PostRepository};

use super::{missing_parent, require_principal};

/// Like count of a post as seen by one caller.
#[derive(Debug, Clone, Serialize)]
pub struct LikeSummary {
    pub post_id: Uuid,
    pub likes: u64,
    pub liked: bool,
}

/// Like/unlike use cases. Both directions are idempotent.
pub struct LikeService {
    posts: Arc<dyn PostRepository>,
    likes: Arc<dyn LikeRepository>,
}

impl LikeService {
    pub fn new(posts: Arc<dyn PostRepository>, likes: Arc<dyn LikeRepository>) -> Self {
        Self { posts, likes }
    }

    pub async fn like(
        &self,
        principal: Option<&Principal>,
        post_id: Uuid,
    ) -> Result<LikeSummary, DomainError> {
        let principal = require_principal(principal)?;
        self.ensure_post(post_id).await?;

        if self
            .likes
            .find_by_post_and_user(post_id, principal.user_id)
            .await?
            .is_none()
        {
            match self.likes.save(Like::new(post_id, principal.user_id)).await {
                // Lost a race against a concurrent like by the same user.
                Ok(_) | Err(RepoError::Constraint(_)) => {}
                Err(e) => return Err(missing_parent("Post", post_id)(e)),
            }
        }

        self.summary(Some(principal), post_id).await
    }

    pub async fn unlike(
        &self,
        principal: Option<&Principal>,
        post_id: Uuid,
    ) -> Result<LikeSummary, DomainError> {
        let principal = require_principal(principal)?;
        self.ensure_post(post_id).await?;

        if let Some(like) = self
            .likes
            .find_by_post_and_user(post_id, principal.user_id)
            .await?
        {
            match self.likes.delete(like.id).await {
                Ok(()) | Err(RepoError::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.summary(Some(principal), post_id).await
    }

    /// Count likes on a post; `liked` reflects the caller, if any.
    pub async fn summary(
        &self,
        principal: Option<&Principal>,
        post_id: Uuid,
    ) -> Result<LikeSummary, DomainError> {
        self.ensure_post(post_id).await?;

        let likes = self.likes.count_by_post(post_id).await?;
        let liked = match principal {
            Some(p) => self
                .likes
                .find_by_post_and_user(post_id, p.user_id)
                .await?
                .is_some(),
            None => false,
        };

        Ok(LikeSummary {
            post_id,
            likes,
            liked,
        })
    }

    async fn ensure_post(&self, post_id: Uuid) -> Result<(), DomainError> {
        match self.posts.find_by_id(post_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Post", post_id)),
        }
    }
}
