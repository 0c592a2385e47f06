//! Authentication implementations.

mod manager;
mod password;

pub use manager::RepositoryAuthenticationManager;
pub use password::Argon2PasswordService;
