//! SeaORM entities and their conversions to the domain types.

pub mod comment;
pub mod like;
pub mod post;
pub mod user;
