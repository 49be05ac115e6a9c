//! Error handling utilities for repositories

use microblog_core::error::DomainError;
use microblog_core::value_objects::{MicropostId, UserId};
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    map_db_error(e)
}

/// Map foreign key and check constraint violations, falling back to a database error
pub fn map_constraint_violation<F, C>(e: SqlxError, on_foreign_key: F, on_check: C) -> DomainError
where
    F: FnOnce() -> DomainError,
    C: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return on_foreign_key();
        }
        if db_err.is_check_violation() {
            return on_check();
        }
    }
    map_db_error(e)
}

/// Create a "user not found" error
pub fn user_not_found(id: UserId) -> DomainError {
    DomainError::UserNotFound(id)
}

/// Create a "micropost not found" error
pub fn micropost_not_found(id: MicropostId) -> DomainError {
    DomainError::MicropostNotFound(id)
}
