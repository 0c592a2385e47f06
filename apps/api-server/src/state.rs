//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use forum_core::ports::{
    Cache, CommentRepository, LikeRepository, PasswordService, PostRepository, RateLimiter,
    SessionStore, UserRepository,
};
use forum_core::services::{AuthService, CommentService, LikeService, PostService};
use forum_infra::database::DatabaseConfig;
use forum_infra::{
    Argon2PasswordService, CacheSessionStore, InMemoryCache, InMemoryDatabase,
    RepositoryAuthenticationManager,
};

use crate::config::{AppConfig, SessionConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub likes: Arc<LikeService>,
    pub sessions: Arc<dyn SessionStore>,
    pub session: SessionConfig,
    /// Applied to the auth routes when present.
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
}

/// The four repositories, from whichever backend is available.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub likes: Arc<dyn LikeRepository>,
}

impl Repositories {
    pub fn in_memory(db: &InMemoryDatabase) -> Self {
        Self {
            users: Arc::new(db.users()),
            posts: Arc::new(db.posts()),
            comments: Arc::new(db.comments()),
            likes: Arc::new(db.likes()),
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(conn: forum_infra::database::DbConn) -> Self {
        use forum_infra::database::{
            PostgresCommentRepository, PostgresLikeRepository, PostgresPostRepository,
            PostgresUserRepository,
        };

        let conn = Arc::new(conn);
        Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn.clone())),
            likes: Arc::new(PostgresLikeRepository::new(conn)),
        }
    }
}

/// Reasons the server refuses to start.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Database connection failed: {0}")]
    Database(String),

    #[error("Redis connection failed: {0}")]
    Redis(String),

    #[error("{setting} is set but the `{feature}` feature is disabled")]
    FeatureDisabled {
        setting: &'static str,
        feature: &'static str,
    },
}

impl AppState {
    /// Build the application state from the configured backends.
    ///
    /// A backend that is configured but unreachable is an error; in-memory
    /// adapters are used only for backends left unconfigured.
    pub async fn new(config: &AppConfig) -> Result<Self, StartupError> {
        let repositories = match &config.database {
            Some(db_config) => postgres_repositories(db_config).await?,
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Repositories::in_memory(&InMemoryDatabase::new())
            }
        };

        let cache = match &config.redis_url {
            Some(url) => redis_cache(url).await?,
            None => in_memory_cache(config.session.ttl),
        };

        let mut state = Self::from_parts(
            repositories,
            cache,
            Arc::new(Argon2PasswordService::new()),
            config.session.clone(),
        );
        state.rate_limiter = rate_limiter(config);

        tracing::info!("Application state initialized");
        Ok(state)
    }

    /// Wire the services from already-built adapters.
    pub fn from_parts(
        repositories: Repositories,
        cache: Arc<dyn Cache>,
        passwords: Arc<dyn PasswordService>,
        session: SessionConfig,
    ) -> Self {
        let Repositories {
            users,
            posts,
            comments,
            likes,
        } = repositories;

        let sessions: Arc<dyn SessionStore> = Arc::new(CacheSessionStore::new(cache, session.ttl));
        let authenticator = Arc::new(RepositoryAuthenticationManager::new(
            users.clone(),
            passwords.clone(),
        ));

        Self {
            auth: Arc::new(AuthService::new(
                users,
                passwords,
                authenticator,
                sessions.clone(),
            )),
            posts: Arc::new(PostService::new(posts.clone())),
            comments: Arc::new(CommentService::new(posts.clone(), comments)),
            likes: Arc::new(LikeService::new(posts, likes)),
            sessions,
            session,
            rate_limiter: None,
        }
    }
}

#[cfg(feature = "postgres")]
async fn postgres_repositories(config: &DatabaseConfig) -> Result<Repositories, StartupError> {
    let conn = forum_infra::database::connect(config)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    Ok(Repositories::postgres(conn))
}

#[cfg(not(feature = "postgres"))]
async fn postgres_repositories(_config: &DatabaseConfig) -> Result<Repositories, StartupError> {
    Err(StartupError::FeatureDisabled {
        setting: "DATABASE_URL",
        feature: "postgres",
    })
}

#[cfg(feature = "redis")]
async fn redis_cache(url: &str) -> Result<Arc<dyn Cache>, StartupError> {
    let config = forum_infra::RedisConfig::new(url.to_string());
    let cache = forum_infra::RedisCache::connect(&config)
        .await
        .map_err(|e| StartupError::Redis(e.to_string()))?;
    tracing::info!("Sessions stored in Redis");
    Ok(Arc::new(cache))
}

#[cfg(not(feature = "redis"))]
async fn redis_cache(_url: &str) -> Result<Arc<dyn Cache>, StartupError> {
    Err(StartupError::FeatureDisabled {
        setting: "REDIS_URL",
        feature: "redis",
    })
}

/// Process-local session cache, swept once per session lifetime.
fn in_memory_cache(ttl: Duration) -> Arc<dyn Cache> {
    let cache = Arc::new(InMemoryCache::new());
    spawn_periodic(ttl, {
        let cache = cache.clone();
        move || {
            let cache = cache.clone();
            async move {
                let purged = cache.purge_expired().await;
                if purged > 0 {
                    tracing::debug!(purged, "Expired sessions purged");
                }
            }
        }
    });
    cache
}

#[cfg(feature = "rate-limit")]
fn rate_limiter(config: &AppConfig) -> Option<Arc<dyn RateLimiter>> {
    use forum_infra::InMemoryRateLimiter;

    match InMemoryRateLimiter::new(&config.rate_limit) {
        Ok(limiter) => {
            let limiter = Arc::new(limiter);
            spawn_periodic(config.rate_limit.window, {
                let limiter = limiter.clone();
                move || {
                    let limiter = limiter.clone();
                    async move { limiter.prune() }
                }
            });
            Some(limiter)
        }
        Err(e) => {
            tracing::error!("Rate limiting disabled: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "rate-limit"))]
fn rate_limiter(_config: &AppConfig) -> Option<Arc<dyn RateLimiter>> {
    None
}

/// Run `task` every `period` on the current runtime.
fn spawn_periodic<F, Fut>(period: Duration, task: F)
where
    F: Fn() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let period = period.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            task().await;
        }
    });
}

/// In-memory state with a cheap password hasher.
#[cfg(test)]
pub fn test_state() -> AppState {
    let passwords = Argon2PasswordService::with_params(1024, 1, 1)
        .expect("valid argon2 parameters");

    AppState::from_parts(
        Repositories::in_memory(&InMemoryDatabase::new()),
        Arc::new(InMemoryCache::new()),
        Arc::new(passwords),
        SessionConfig::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: &'static str, value: &'static str) -> AppConfig {
        AppConfig::from_lookup(|k| (k == key).then(|| value.to_string()))
    }

    #[actix_web::test]
    async fn test_starts_in_memory_when_unconfigured() {
        let config = AppConfig::from_lookup(|_| None);
        assert!(AppState::new(&config).await.is_ok());
    }

    #[actix_web::test]
    async fn test_unreachable_database_is_fatal() {
        let config = config("DATABASE_URL", "not-a-database-url");

        let err = AppState::new(&config).await.err().unwrap();

        assert!(matches!(
            err,
            StartupError::Database(_) | StartupError::FeatureDisabled { .. }
        ));
    }

    #[actix_web::test]
    async fn test_unreachable_redis_is_fatal() {
        let config = config("REDIS_URL", "redis://127.0.0.1:1");

        let err = AppState::new(&config).await.err().unwrap();

        assert!(matches!(
            err,
            StartupError::Redis(_) | StartupError::FeatureDisabled { .. }
        ));
    }
}
