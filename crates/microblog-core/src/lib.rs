//! # microblog-core
//!
//! Domain layer containing entities, value objects, validation rules and the
//! repository and mailer traits. This crate has no dependencies on
//! infrastructure (database, web framework, mail transport).

pub mod entities;
pub mod error;
pub mod traits;
pub mod validation;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    normalize_email, validate_content, FollowEdge, Micropost, NewMicropost, NewUser, Relationship,
    TokenKind, User, PASSWORD_RESET_WINDOW_HOURS,
};
pub use error::DomainError;
pub use traits::{
    Mailer, MicropostRepository, PageQuery, RelationshipRepository, RepoResult, UserRepository,
};
pub use value_objects::{IdParseError, MicropostId, UserId};
