//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use forum_core::domain::Comment;
use forum_shared::ApiResponse;
use forum_shared::dto::{CommentResponse, CreateCommentRequest};

use crate::middleware::error::AppResult;
use crate::middleware::session::Authentication;
use crate::state::AppState;

fn comment_response(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        author_id: comment.author_id,
        content: comment.content,
        created_at: comment.created_at,
    }
}

/// GET /api/posts/{id}/comments
pub async fn list(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let comments: Vec<CommentResponse> = state
        .comments
        .list(path.into_inner())
        .await?
        .into_iter()
        .map(comment_response)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(comments)))
}

/// POST /api/posts/{id}/comments
pub async fn create(
    state: web::Data<AppState>,
    auth: Authentication,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .comments
        .add(auth.principal(), path.into_inner(), body.into_inner().content)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(comment_response(comment))))
}

/// DELETE /api/comments/{id}
pub async fn delete(
    state: web::Data<AppState>,
    auth: Authentication,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .comments
        .delete(auth.principal(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Comment deleted")))
}
