//! # Forum Core
//!
//! The domain layer of the forum backend: entities, ports and the
//! application services that drive them.
//! This crate has no infrastructure dependencies; adapters live in `forum-infra`.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
