//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod likes;
mod posts;

use actix_web::web;

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .wrap(RateLimitMiddleware)
                    .route("/signup", web::post().to(auth::signup))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me))
                    .route("/principal", web::get().to(auth::principal))
                    .route("/logout", web::post().to(auth::logout)),
            )
            // Forum routes
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/{id}", web::get().to(posts::get))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{id}/comments", web::get().to(comments::list))
                    .route("/{id}/comments", web::post().to(comments::create))
                    .route("/{id}/likes", web::get().to(likes::summary))
                    .route("/{id}/likes", web::post().to(likes::like))
                    .route("/{id}/likes", web::delete().to(likes::unlike)),
            )
            .route("/comments/{id}", web::delete().to(comments::delete))
            .route("/users/{id}/posts", web::get().to(posts::by_author)),
    );
}

/// Malformed JSON bodies get the same problem+json shape as every other error.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Unparsable path segments, such as an id that is not a UUID.
fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

#[cfg(test)]
pub(crate) mod test_support {
    use actix_web::cookie::Cookie;
    use actix_web::dev::ServiceResponse;
    use actix_web::{App, test, web};
    use serde_json::{Value, json};

    use crate::state::{AppState, test_state};

    pub async fn app() -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    > {
        app_with(test_state()).await
    }

    pub async fn app_with(
        state: AppState,
    ) -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    > {
        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(super::configure_routes),
        )
        .await
    }

    pub async fn body(resp: ServiceResponse) -> Value {
        test::read_body_json(resp).await
    }

    /// Sign up and log in, returning the session cookie.
    pub async fn member<S>(app: &S, username: &str) -> Cookie<'static>
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = ServiceResponse,
                Error = actix_web::Error,
            >,
    {
        let signup = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "correct horse battery",
            }))
            .to_request();
        assert!(test::call_service(app, signup).await.status().is_success());

        let login = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "username": username, "password": "correct horse battery" }))
            .to_request();
        let resp = test::call_service(app, login).await;
        assert!(resp.status().is_success());

        session_cookie(&resp).expect("login sets the session cookie")
    }

    pub fn session_cookie(resp: &ServiceResponse) -> Option<Cookie<'static>> {
        resp.response()
            .cookies()
            .find(|c| c.name() == "FORUM_SESSION")
            .map(|c| c.into_owned())
    }
}
