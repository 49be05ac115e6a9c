//! User database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of the `users` table, minus the password digest
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub admin: bool,
    pub activated: bool,
    pub activated_at: Option<DateTime<Utc>>,
    pub activation_digest: Option<String>,
    pub remember_digest: Option<String>,
    pub reset_digest: Option<String>,
    pub reset_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
