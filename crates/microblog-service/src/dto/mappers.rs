//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use microblog_core::entities::{Micropost, User};

use super::responses::{
    CurrentUserResponse, MicropostResponse, ProfileResponse, UserResponse, AVATAR_SIZE,
};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            gravatar_url: user.gravatar_url(AVATAR_SIZE),
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

impl From<&User> for CurrentUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            gravatar_url: user.gravatar_url(AVATAR_SIZE),
            admin: user.admin,
            activated: user.activated,
            activated_at: user.activated_at,
            created_at: user.created_at,
        }
    }
}

impl From<User> for CurrentUserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

/// Counts shown next to a profile
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileCounts {
    pub microposts: i64,
    pub following: i64,
    pub followers: i64,
}

impl ProfileResponse {
    pub fn new(user: &User, counts: ProfileCounts) -> Self {
        Self {
            user: UserResponse::from(user),
            microposts_count: counts.microposts,
            following_count: counts.following,
            followers_count: counts.followers,
        }
    }
}

// ============================================================================
// Micropost Mappers
// ============================================================================

impl MicropostResponse {
    /// Pair a post with its author
    pub fn new(micropost: Micropost, author: &User) -> Self {
        Self {
            id: micropost.id,
            content: micropost.content,
            user: UserResponse::from(author),
            created_at: micropost.created_at,
        }
    }
}
