//! # Forum Infrastructure
//!
//! Concrete implementations of the ports defined in `forum-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL repositories via SeaORM
//! - `rate-limit` - Per-client rate limiting via governor
//! - `redis` - Redis-backed session cache

pub mod auth;
pub mod cache;
pub mod database;
pub mod session;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

pub use auth::{Argon2PasswordService, RepositoryAuthenticationManager};
pub use cache::InMemoryCache;
pub use database::InMemoryDatabase;
pub use session::CacheSessionStore;

#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

#[cfg(test)]
mod tests;
