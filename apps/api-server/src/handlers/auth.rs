//! Authentication handlers.

use actix_web::{HttpResponse, web};

use forum_core::DomainError;
use forum_core::domain::{Principal, User};
use forum_core::services::{Credentials, Registration};
use forum_shared::ApiResponse;
use forum_shared::dto::{LoginRequest, PrincipalResponse, SignupRequest, UserResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::middleware::session::Authentication;
use crate::state::AppState;

fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        created_at: user.created_at,
    }
}

fn principal_response(principal: Principal) -> PrincipalResponse {
    PrincipalResponse {
        user_id: principal.user_id,
        username: principal.username,
        authenticated_at: principal.authenticated_at,
    }
}

/// POST /api/auth/signup
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .auth
        .signup(Registration {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        user_response(user),
        "User created successfully",
    )))
}

/// POST /api/auth/login
///
/// Empty body; the session id travels in the `Set-Cookie` header.
pub async fn login(
    state: web::Data<AppState>,
    auth: Authentication,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let session = state
        .auth
        .login(
            Credentials {
                username: req.username,
                password: req.password,
            },
            auth.session_id(),
        )
        .await
        .map_err(|e| match e {
            DomainError::Unauthorized => {
                AppError::Unauthorized("Invalid username or password".to_string())
            }
            other => other.into(),
        })?;

    Ok(HttpResponse::Ok()
        .cookie(state.session.session_cookie(&session.id))
        .finish())
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, auth: Authentication) -> AppResult<HttpResponse> {
    let user = state.auth.current_user(auth.principal()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(user))))
}

/// GET /api/auth/principal
pub async fn principal(
    state: web::Data<AppState>,
    auth: Authentication,
) -> AppResult<HttpResponse> {
    let principal = state.auth.current_principal(auth.principal())?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(principal_response(principal))))
}

/// POST /api/auth/logout
pub async fn logout(state: web::Data<AppState>, auth: Authentication) -> AppResult<HttpResponse> {
    state.auth.logout(auth.session_id()).await?;

    Ok(HttpResponse::Ok()
        .cookie(state.session.removal_cookie())
        .json(ApiResponse::message("Logout successful")))
}
