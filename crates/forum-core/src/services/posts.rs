use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Post, PostChanges, Principal};
use crate::error::DomainError;
use crate::ports::PostRepository;

use super::{missing_parent, require_principal, require_text};

pub const MAX_TITLE_LEN: usize = 300;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Post use cases. Only a post's author may edit or delete it.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    pub async fn create(
        &self,
        principal: Option<&Principal>,
        title: String,
        content: String,
    ) -> Result<Post, DomainError> {
        let principal = require_principal(principal)?;
        validate_title(&title)?;
        require_text("content", &content)?;

        let post = self
            .posts
            .save(Post::new(principal.user_id, title, content))
            .await
            .map_err(missing_parent("User", principal.user_id))?;
        tracing::info!(post_id = %post.id, author_id = %post.author_id, "Post created");
        Ok(post)
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    pub async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Post>, DomainError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        Ok(self.posts.list_recent(limit, offset).await?)
    }

    pub async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_by_author(author_id).await?)
    }

    pub async fn update(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
        changes: PostChanges,
    ) -> Result<Post, DomainError> {
        let principal = require_principal(principal)?;
        if let Some(title) = &changes.title {
            validate_title(title)?;
        }
        if let Some(content) = &changes.content {
            require_text("content", content)?;
        }

        let mut post = self.get(id).await?;
        if !post.is_authored_by(principal.user_id) {
            return Err(DomainError::Forbidden);
        }
        if changes.is_empty() {
            return Ok(post);
        }

        post.apply(changes);
        Ok(self.posts.save(post).await?)
    }

    /// Delete a post together with its comments and likes.
    pub async fn delete(&self, principal: Option<&Principal>, id: Uuid) -> Result<(), DomainError> {
        let principal = require_principal(principal)?;
        let post = self.get(id).await?;
        if !post.is_authored_by(principal.user_id) {
            return Err(DomainError::Forbidden);
        }

        self.posts.delete(id).await?;
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    require_text("title", title)?;
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::Validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}
