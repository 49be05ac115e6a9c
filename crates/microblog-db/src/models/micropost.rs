//! Micropost database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for microposts table
#[derive(Debug, Clone, FromRow)]
pub struct MicropostModel {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
