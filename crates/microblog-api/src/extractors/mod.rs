//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validation, pagination and
//! path parameters.

mod auth;
mod pagination;
mod path;
mod validated;

pub use auth::AuthUser;
pub use pagination::{Pagination, PaginationParams};
pub use path::{ApiPath, FollowedIdPath, MicropostIdPath, TokenPath, UserIdPath};
pub use validated::{ApiJson, ValidatedJson};
