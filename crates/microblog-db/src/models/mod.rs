//! Database models - SQLx-compatible structs for PostgreSQL tables

mod micropost;
mod relationship;
mod user;

pub use micropost::MicropostModel;
pub use relationship::RelationshipModel;
pub use user::UserModel;
