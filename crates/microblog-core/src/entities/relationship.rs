//! Relationship entity - a directed follow edge between two users

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::UserId;

/// `follower_id` follows `followed_id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub follower_id: UserId,
    pub followed_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Relationship {
    pub fn new(edge: FollowEdge) -> Self {
        Self {
            follower_id: edge.follower_id,
            followed_id: edge.followed_id,
            created_at: Utc::now(),
        }
    }
}

/// A validated follow edge. Both ends are present and distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FollowEdge {
    pub follower_id: UserId,
    pub followed_id: UserId,
}

impl FollowEdge {
    pub fn new(follower_id: UserId, followed_id: UserId) -> Result<Self, DomainError> {
        if follower_id == followed_id {
            return Err(DomainError::CannotFollowSelf);
        }
        Ok(Self {
            follower_id,
            followed_id,
        })
    }

    /// Build an edge from possibly-missing ends
    pub fn from_parts(
        follower_id: Option<UserId>,
        followed_id: Option<UserId>,
    ) -> Result<Self, DomainError> {
        let follower_id = follower_id
            .ok_or_else(|| DomainError::ValidationError("follower_id is required".to_string()))?;
        let followed_id = followed_id
            .ok_or_else(|| DomainError::ValidationError("followed_id is required".to_string()))?;
        Self::new(follower_id, followed_id)
    }
}
