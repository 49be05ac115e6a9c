//! Domain entities - core business objects

mod micropost;
mod relationship;
mod user;

pub use micropost::{validate_content, Micropost, NewMicropost};
pub use relationship::{FollowEdge, Relationship};
pub use user::{normalize_email, NewUser, TokenKind, User, PASSWORD_RESET_WINDOW_HOURS};
