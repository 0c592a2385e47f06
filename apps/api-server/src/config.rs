//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use forum_infra::database::DatabaseConfig;
#[cfg(feature = "rate-limit")]
use forum_infra::rate_limit::RateLimitConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub redis_url: Option<String>,
    pub session: SessionConfig,
    #[cfg(feature = "rate-limit")]
    pub rate_limit: RateLimitConfig,
}

/// Session cookie and lifetime settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Idle timeout; every authenticated request extends it.
    pub ttl: Duration,
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "FORUM_SESSION".to_string(),
            ttl: Duration::from_secs(1800),
            secure: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let database = get("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .map(|url| DatabaseConfig {
                url,
                max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 100),
                min_connections: parse_or(&get, "DB_MIN_CONNECTIONS", 10),
            });

        let defaults = SessionConfig::default();
        let session = SessionConfig {
            cookie_name: get("SESSION_COOKIE_NAME").unwrap_or(defaults.cookie_name),
            ttl: Duration::from_secs(parse_or(&get, "SESSION_TTL_SECS", defaults.ttl.as_secs())),
            secure: get("SESSION_COOKIE_SECURE").is_some_and(|v| is_truthy(&v)),
        };

        Self {
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&get, "PORT", 8080),
            database,
            redis_url: get("REDIS_URL").filter(|url| !url.is_empty()),
            session,
            #[cfg(feature = "rate-limit")]
            rate_limit: RateLimitConfig {
                max_requests: parse_or(&get, "RATE_LIMIT_MAX_REQUESTS", 20),
                window: Duration::from_secs(parse_or(&get, "RATE_LIMIT_WINDOW_SECS", 60)),
            },
        }
    }
}

fn parse_or<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparsable setting");
            default
        }),
        None => default,
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
