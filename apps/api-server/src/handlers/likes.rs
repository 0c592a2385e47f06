//! Like handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use forum_core::services::LikeSummary;
use forum_shared::ApiResponse;
use forum_shared::dto::LikeResponse;

use crate::middleware::error::AppResult;
use crate::middleware::session::Authentication;
use crate::state::AppState;

fn like_response(summary: LikeSummary) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(LikeResponse {
        post_id: summary.post_id,
        likes: summary.likes,
        liked: summary.liked,
    }))
}

/// GET /api/posts/{id}/likes
pub async fn summary(
    state: web::Data<AppState>,
    auth: Authentication,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let summary = state
        .likes
        .summary(auth.principal(), path.into_inner())
        .await?;
    Ok(like_response(summary))
}

/// POST /api/posts/{id}/likes
pub async fn like(
    state: web::Data<AppState>,
    auth: Authentication,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let summary = state.likes.like(auth.principal(), path.into_inner()).await?;
    Ok(like_response(summary))
}

/// DELETE /api/posts/{id}/likes
pub async fn unlike(
    state: web::Data<AppState>,
    auth: Authentication,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let summary = state
        .likes
        .unlike(auth.principal(), path.into_inner())
        .await?;
    Ok(like_response(summary))
}
