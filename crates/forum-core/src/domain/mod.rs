//! Domain entities - the core business objects.

mod comment;
mod like;
mod post;
mod principal;
mod user;

pub use comment::Comment;
pub use like::Like;
pub use post::{Post, PostChanges};
pub use principal::Principal;
pub use user::User;
