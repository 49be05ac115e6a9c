//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer states what it needs; `microblog-db` supplies the
//! PostgreSQL implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{FollowEdge, Micropost, NewMicropost, NewUser, Relationship, User};
use crate::error::DomainError;
use crate::value_objects::{MicropostId, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// A page-at-a-time window over an ordered listing.
///
/// Pages are 1-based. Build one with [`PageQuery::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    page: u32,
    per_page: u32,
}

impl PageQuery {
    pub const DEFAULT_PER_PAGE: u32 = 30;
    pub const MAX_PER_PAGE: u32 = 100;

    /// Build a window, clamping nonsense values into range
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    #[inline]
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    #[inline]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }

    /// Number of pages needed to show `total` items
    pub fn total_pages(&self, total: i64) -> u32 {
        if total <= 0 {
            return 0;
        }
        let per_page = i64::from(self.per_page);
        u32::try_from((total + per_page - 1) / per_page).unwrap_or(u32::MAX)
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_PER_PAGE)
    }
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;

    /// Find user by email, ignoring case
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Check if email is taken by anyone other than `except`
    async fn email_exists(&self, email: &str, except: Option<UserId>) -> RepoResult<bool>;

    /// Insert a user and return it with its assigned id
    async fn create(&self, user: &NewUser, password_hash: &str) -> RepoResult<User>;

    /// Persist name and email changes
    async fn update_profile(&self, user: &User) -> RepoResult<()>;

    /// Delete a user together with its microposts and follow edges.
    ///
    /// Returns the number of microposts removed.
    async fn delete(&self, id: UserId) -> RepoResult<u64>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>>;

    /// Update password hash
    async fn update_password(&self, id: UserId, password_hash: &str) -> RepoResult<()>;

    /// Store or clear the remember-me digest
    async fn update_remember_digest(&self, id: UserId, digest: Option<&str>) -> RepoResult<()>;

    /// Mark the user as activated
    async fn activate(&self, id: UserId, activated_at: DateTime<Utc>) -> RepoResult<()>;

    /// Store or clear the password reset digest and its issue time
    async fn update_reset_digest(
        &self,
        id: UserId,
        digest: Option<&str>,
        sent_at: Option<DateTime<Utc>>,
    ) -> RepoResult<()>;

    /// Grant or revoke administrator rights
    async fn set_admin(&self, id: UserId, admin: bool) -> RepoResult<()>;

    /// List activated users ordered by id
    async fn list_activated(&self, query: PageQuery) -> RepoResult<Vec<User>>;

    /// Count activated users
    async fn count_activated(&self) -> RepoResult<i64>;
}

// ============================================================================
// Micropost Repository
// ============================================================================

#[async_trait]
pub trait MicropostRepository: Send + Sync {
    /// Find micropost by ID
    async fn find_by_id(&self, id: MicropostId) -> RepoResult<Option<Micropost>>;

    /// Insert a micropost and return it with its assigned id
    async fn create(&self, micropost: &NewMicropost) -> RepoResult<Micropost>;

    /// Delete a micropost
    async fn delete(&self, id: MicropostId) -> RepoResult<()>;

    /// A user's own posts, newest first
    async fn find_by_user(&self, user_id: UserId, query: PageQuery) -> RepoResult<Vec<Micropost>>;

    /// Count a user's posts
    async fn count_by_user(&self, user_id: UserId) -> RepoResult<i64>;

    /// Posts by the user and everyone they currently follow, newest first
    async fn feed(&self, user_id: UserId, query: PageQuery) -> RepoResult<Vec<Micropost>>;

    /// Count feed entries for the user
    async fn count_feed(&self, user_id: UserId) -> RepoResult<i64>;
}

// ============================================================================
// Relationship Repository
// ============================================================================

#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    /// Add an edge. Returns false when it already existed.
    async fn follow(&self, edge: FollowEdge) -> RepoResult<bool>;

    /// Remove an edge. Returns false when there was none.
    async fn unfollow(&self, follower_id: UserId, followed_id: UserId) -> RepoResult<bool>;

    /// Find the edge between two users
    async fn find(
        &self,
        follower_id: UserId,
        followed_id: UserId,
    ) -> RepoResult<Option<Relationship>>;

    /// Users that `user_id` follows
    async fn following(&self, user_id: UserId, query: PageQuery) -> RepoResult<Vec<User>>;

    /// Users following `user_id`
    async fn followers(&self, user_id: UserId, query: PageQuery) -> RepoResult<Vec<User>>;

    async fn count_following(&self, user_id: UserId) -> RepoResult<i64>;

    async fn count_followers(&self, user_id: UserId) -> RepoResult<i64>;
}
