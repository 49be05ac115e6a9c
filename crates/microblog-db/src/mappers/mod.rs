//! Model to entity mappers
//!
//! `From<Model> for Entity` conversions for rows read from PostgreSQL.
//! Writes bind entity fields directly.

mod micropost;
mod relationship;
mod user;
