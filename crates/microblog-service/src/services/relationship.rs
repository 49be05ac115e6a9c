//! Relationship service
//!
//! Follow and unfollow on behalf of the current user.

use microblog_core::entities::FollowEdge;
use microblog_core::UserId;
use tracing::{info, instrument};

use crate::dto::{FollowRequest, FollowResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Relationship service
pub struct RelationshipService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RelationshipService<'a> {
    /// Create a new RelationshipService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Follow a user. Following twice leaves a single edge.
    #[instrument(skip(self, request), fields(followed_id = ?request.followed_id))]
    pub async fn follow(&self, follower_id: UserId, request: FollowRequest) -> ServiceResult<FollowResponse> {
        let edge = FollowEdge::from_parts(Some(follower_id), request.followed_id)?;
        let followed = self.ctx.require_user(edge.followed_id).await?;

        if self.ctx.relationship_repo().follow(edge).await? {
            info!(follower_id = %follower_id, "Followed user");
        }

        self.status_of(followed.id, true).await
    }

    /// Stop following a user. Unfollowing a stranger is a no-op.
    #[instrument(skip(self))]
    pub async fn unfollow(&self, follower_id: UserId, followed_id: UserId) -> ServiceResult<FollowResponse> {
        let followed = self.ctx.require_user(followed_id).await?;

        if self
            .ctx
            .relationship_repo()
            .unfollow(follower_id, followed.id)
            .await?
        {
            info!(follower_id = %follower_id, followed_id = %followed_id, "Unfollowed user");
        }

        self.status_of(followed.id, false).await
    }

    /// Whether `follower_id` follows `followed_id`
    #[instrument(skip(self))]
    pub async fn is_following(&self, follower_id: UserId, followed_id: UserId) -> ServiceResult<bool> {
        Ok(self
            .ctx
            .relationship_repo()
            .find(follower_id, followed_id)
            .await?
            .is_some())
    }

    /// Follow state as seen by `follower_id`
    #[instrument(skip(self))]
    pub async fn status(&self, follower_id: UserId, followed_id: UserId) -> ServiceResult<FollowResponse> {
        let followed = self.ctx.require_user(followed_id).await?;
        let following = self.is_following(follower_id, followed.id).await?;
        self.status_of(followed.id, following).await
    }

    async fn status_of(&self, followed_id: UserId, following: bool) -> ServiceResult<FollowResponse> {
        let followers_count = self
            .ctx
            .relationship_repo()
            .count_followers(followed_id)
            .await?;

        Ok(FollowResponse {
            followed_id,
            following,
            followers_count,
        })
    }
}
