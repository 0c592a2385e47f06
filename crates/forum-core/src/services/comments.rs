use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Comment, Principal};
use crate::error::DomainError;
use crate::ports::{CommentRepository, PostRepository};

use super::{missing_parent, require_principal, require_text};

pub struct CommentService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    pub async fn add(
        &self,
        principal: Option<&Principal>,
        post_id: Uuid,
        content: String,
    ) -> Result<Comment, DomainError> {
        let principal = require_principal(principal)?;
        require_text("content", &content)?;
        self.ensure_post(post_id).await?;

        self.comments
            .save(Comment::new(post_id, principal.user_id, content))
            .await
            .map_err(missing_parent("Post", post_id))
    }

    pub async fn list(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        self.ensure_post(post_id).await?;
        Ok(self.comments.find_by_post(post_id).await?)
    }

    pub async fn delete(&self, principal: Option<&Principal>, id: Uuid) -> Result<(), DomainError> {
        let principal = require_principal(principal)?;
        let comment = self
            .comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", id))?;
        if comment.author_id != principal.user_id {
            return Err(DomainError::Forbidden);
        }

        Ok(self.comments.delete(id).await?)
    }

    async fn ensure_post(&self, post_id: Uuid) -> Result<(), DomainError> {
        match self.posts.find_by_id(post_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Post", post_id)),
        }
    }
}
