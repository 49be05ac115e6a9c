//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in
//! microblog-core.

mod error;
mod micropost;
mod relationship;
mod user;

pub use micropost::PgMicropostRepository;
pub use relationship::PgRelationshipRepository;
pub use user::PgUserRepository;
