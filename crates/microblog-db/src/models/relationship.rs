//! Relationship database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for relationships table
#[derive(Debug, Clone, FromRow)]
pub struct RelationshipModel {
    pub follower_id: i64,
    pub followed_id: i64,
    pub created_at: DateTime<Utc>,
}
