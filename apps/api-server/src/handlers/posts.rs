//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use forum_core::domain::{Post, PostChanges};
use forum_shared::ApiResponse;
use forum_shared::dto::{CreatePostRequest, PageQuery, PostResponse, UpdatePostRequest};

use crate::middleware::error::AppResult;
use crate::middleware::session::Authentication;
use crate::state::AppState;

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        author_id: post.author_id,
        title: post.title,
        content: post.content,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn post_list(posts: Vec<Post>) -> Vec<PostResponse> {
    posts.into_iter().map(post_response).collect()
}

/// GET /api/posts?limit=&offset=
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.list(query.limit, query.offset).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_list(posts))))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    auth: Authentication,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .posts
        .create(auth.principal(), req.title, req.content)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(post_response(post))))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    auth: Authentication,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = PostChanges {
        title: req.title,
        content: req.content,
    };

    let post = state
        .posts
        .update(auth.principal(), path.into_inner(), changes)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// DELETE /api/posts/{id}
///
/// Comments and likes on the post go with it.
pub async fn delete(
    state: web::Data<AppState>,
    auth: Authentication,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.posts.delete(auth.principal(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Post deleted")))
}

/// GET /api/users/{id}/posts
pub async fn by_author(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.list_by_author(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_list(posts))))
}

#[cfg(test)]
mod tests {
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use crate::handlers::test_support::{app, body, member};

    async fn create_post<S>(app: &S, cookie: &Cookie<'static>, title: &str) -> Value
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
            >,
    {
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .cookie(cookie.clone())
            .set_json(json!({ "title": title, "content": "Body" }))
            .to_request();
        let resp = test::call_service(app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body(resp).await["data"].clone()
    }

    #[actix_web::test]
    async fn test_create_requires_session() {
        let app = app().await;
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({ "title": "Hello", "content": "World" }))
            .to_request();

        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn test_create_get_and_list() {
        let app = app().await;
        let alice = member(&app, "alice").await;
        let post = create_post(&app, &alice, "Hello").await;
        let id = post["id"].as_str().unwrap();

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri(&format!("/api/posts/{id}")).to_request(),
        )
        .await;
        assert_eq!(body(resp).await["data"]["title"], "Hello");

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/posts?limit=5").to_request(),
        )
        .await;
        assert_eq!(body(resp).await["data"].as_array().unwrap().len(), 1);

        let author = post["author_id"].as_str().unwrap();
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/users/{author}/posts"))
                .to_request(),
        )
        .await;
        assert_eq!(body(resp).await["data"][0]["id"], id);
    }

    #[actix_web::test]
    async fn test_unknown_post_is_not_found() {
        let app = app().await;
        let uri = format!("/api/posts/{}", uuid::Uuid::new_v4());

        let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(resp).await["detail"], "Post not found");
    }

    #[actix_web::test]
    async fn test_malformed_ids_are_problem_json() {
        let app = app().await;
        let cookie = member(&app, "alice").await;

        for req in [
            test::TestRequest::get().uri("/api/posts/not-a-uuid"),
            test::TestRequest::delete()
                .uri("/api/posts/not-a-uuid")
                .cookie(cookie.clone()),
            test::TestRequest::get().uri("/api/posts/not-a-uuid/comments"),
            test::TestRequest::get().uri("/api/users/42/posts"),
        ] {
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body = body(resp).await;
            assert_eq!(body["status"], 400);
            assert_eq!(body["title"], "Bad Request");
        }
    }

    #[actix_web::test]
    async fn test_malformed_page_query_is_problem_json() {
        let app = app().await;

        let req = test::TestRequest::get().uri("/api/posts?limit=minus-one").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(resp).await["status"], 400);
    }

    #[actix_web::test]
    async fn test_only_author_may_update() {
        let app = app().await;
        let alice = member(&app, "alice").await;
        let bob = member(&app, "bob").await;
        let post = create_post(&app, &alice, "Hello").await;
        let uri = format!("/api/posts/{}", post["id"].as_str().unwrap());

        let by_bob = test::TestRequest::put()
            .uri(&uri)
            .cookie(bob)
            .set_json(json!({ "title": "Hijacked" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, by_bob).await.status(),
            StatusCode::FORBIDDEN
        );

        let by_alice = test::TestRequest::put()
            .uri(&uri)
            .cookie(alice)
            .set_json(json!({ "title": "Hello again" }))
            .to_request();
        let resp = test::call_service(&app, by_alice).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let data = body(resp).await["data"].clone();
        assert_eq!(data["title"], "Hello again");
        assert_eq!(data["content"], "Body");
    }

    #[actix_web::test]
    async fn test_delete_post_takes_comments_along() {
        let app = app().await;
        let alice = member(&app, "alice").await;
        let post = create_post(&app, &alice, "Doomed").await;
        let id = post["id"].as_str().unwrap();

        let comment = test::TestRequest::post()
            .uri(&format!("/api/posts/{id}/comments"))
            .cookie(alice.clone())
            .set_json(json!({ "content": "first" }))
            .to_request();
        let resp = test::call_service(&app, comment).await;
        let comment_id = body(resp).await["data"]["id"].as_str().unwrap().to_string();

        let delete = test::TestRequest::delete()
            .uri(&format!("/api/posts/{id}"))
            .cookie(alice.clone())
            .to_request();
        assert_eq!(test::call_service(&app, delete).await.status(), StatusCode::OK);

        let comments = test::TestRequest::get()
            .uri(&format!("/api/posts/{id}/comments"))
            .to_request();
        assert_eq!(
            test::call_service(&app, comments).await.status(),
            StatusCode::NOT_FOUND
        );

        let delete_comment = test::TestRequest::delete()
            .uri(&format!("/api/comments/{comment_id}"))
            .cookie(alice)
            .to_request();
        assert_eq!(
            test::call_service(&app, delete_comment).await.status(),
            StatusCode::NOT_FOUND
        );
    }
}
