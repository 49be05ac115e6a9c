//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Ids serialize as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use microblog_core::{MicropostId, PageQuery, UserId};
use serde::Serialize;

/// Gravatar edge length used in every user view
pub const AVATAR_SIZE: u32 = 80;

// ============================================================================
// Common Response Types
// ============================================================================

/// One page of results with page-number pagination
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, query: PageQuery, total: i64) -> Self {
        Self {
            items,
            page: query.page(),
            per_page: query.per_page(),
            total,
            total_pages: query.total_pages(total),
        }
    }
}

/// Plain acknowledgement carrying a user-facing message
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Session Responses
// ============================================================================

/// Session token handed out on login, activation, reset and restore
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: CurrentUserResponse,
}

impl AuthResponse {
    pub fn new(access_token: String, expires_in: i64, user: CurrentUserResponse) -> Self {
        Self {
            message: None,
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Result of a signup: the pending account and what to do next
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user: CurrentUserResponse,
}

// ============================================================================
// User Responses
// ============================================================================

/// Public user summary
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub gravatar_url: String,
    pub created_at: DateTime<Utc>,
}

/// The signed-in user's own view
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub gravatar_url: String,
    pub admin: bool,
    pub activated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Public profile with graph and post counts
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub microposts_count: i64,
    pub following_count: i64,
    pub followers_count: i64,
}

// ============================================================================
// Micropost Responses
// ============================================================================

/// Micropost with its author
#[derive(Debug, Clone, Serialize)]
pub struct MicropostResponse {
    pub id: MicropostId,
    pub content: String,
    pub user: UserResponse,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Relationship Responses
// ============================================================================

/// Follow state between the current user and `followed_id`
#[derive(Debug, Clone, Serialize)]
pub struct FollowResponse {
    pub followed_id: UserId,
    pub following: bool,
    pub followers_count: i64,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health of each backing service
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
