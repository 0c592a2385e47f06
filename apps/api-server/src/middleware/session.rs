//! Session cookie handling and the authentication extractor.

use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures::future::LocalBoxFuture;

use forum_core::DomainError;
use forum_core::domain::Principal;
use forum_core::ports::SessionId;

use crate::config::SessionConfig;
use crate::middleware::error::AppError;
use crate::state::AppState;

/// Authentication context of the current request.
///
/// Never rejects: handlers pass [`Authentication::principal`] to the
/// services, which decide whether an identity is required.
///
/// ```ignore
/// async fn me(state: web::Data<AppState>, auth: Authentication) -> AppResult<HttpResponse> {
///     let user = state.auth.current_user(auth.principal()).await?;
///     ...
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Authentication {
    session_id: Option<SessionId>,
    principal: Option<Principal>,
}

impl Authentication {
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// The session id presented by the client, live or not.
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }
}

impl FromRequest for Authentication {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
            tracing::error!("AppState not found in app data");
            return Box::pin(async {
                Err(AppError::Internal("Server configuration error".to_string()))
            });
        };

        let session_id = req
            .cookie(&state.session.cookie_name)
            .map(|cookie| SessionId::from(cookie.value()))
            .filter(|id| !id.as_str().is_empty());

        Box::pin(async move {
            let Some(session_id) = session_id else {
                return Ok(Self::default());
            };

            let principal = state
                .sessions
                .load(&session_id)
                .await
                .map_err(DomainError::from)?;

            Ok(Self {
                session_id: Some(session_id),
                principal,
            })
        })
    }
}

impl SessionConfig {
    /// Cookie carrying a freshly issued session id.
    pub fn session_cookie(&self, id: &SessionId) -> Cookie<'static> {
        Cookie::build(self.cookie_name.clone(), id.to_string())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::seconds(self.ttl.as_secs() as i64))
            .finish()
    }

    /// Cookie instructing the client to drop its session id.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(self.cookie_name.clone(), "")
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .finish();
        cookie.make_removal();
        cookie
    }
}
