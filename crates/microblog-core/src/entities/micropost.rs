//! Micropost entity - a short status update owned by a user

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::validation::MICROPOST_MAX_LENGTH;
use crate::value_objects::{MicropostId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Micropost {
    pub id: MicropostId,
    pub user_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Micropost {
    /// Check whether the given user wrote this post
    #[inline]
    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

/// A micropost that passed content validation and awaits insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMicropost {
    pub user_id: UserId,
    pub content: String,
}

impl NewMicropost {
    pub fn new(user_id: UserId, content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        validate_content(&content)?;
        Ok(Self { user_id, content })
    }
}

/// Content must be non-blank and at most 140 characters
pub fn validate_content(content: &str) -> Result<(), DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::BlankContent);
    }
    if content.chars().count() > MICROPOST_MAX_LENGTH {
        return Err(DomainError::ContentTooLong {
            max: MICROPOST_MAX_LENGTH,
        });
    }
    Ok(())
}
