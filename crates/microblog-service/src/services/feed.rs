//! Feed service
//!
//! The home timeline: a user's own posts plus those of everyone they follow,
//! recomputed from the current follow graph on every call.

use std::collections::HashMap;

use microblog_core::entities::User;
use microblog_core::{PageQuery, UserId};
use tracing::{debug, instrument};

use crate::dto::{MicropostResponse, PaginatedResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Feed service
pub struct FeedService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FeedService<'a> {
    /// Create a new FeedService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// One page of `user_id`'s feed, newest first
    #[instrument(skip(self))]
    pub async fn feed(
        &self,
        user_id: UserId,
        query: PageQuery,
    ) -> ServiceResult<PaginatedResponse<MicropostResponse>> {
        let user = self.ctx.require_user(user_id).await?;
        let posts = self.ctx.micropost_repo().feed(user.id, query).await?;
        let total = self.ctx.micropost_repo().count_feed(user.id).await?;

        let mut authors: HashMap<UserId, User> = HashMap::new();
        authors.insert(user.id, user);

        let mut items = Vec::with_capacity(posts.len());
        for post in posts {
            if !authors.contains_key(&post.user_id) {
                let author = self.ctx.require_user(post.user_id).await?;
                authors.insert(author.id, author);
            }
            if let Some(author) = authors.get(&post.user_id) {
                items.push(MicropostResponse::new(post, author));
            }
        }

        debug!(count = items.len(), total, "Feed page built");

        Ok(PaginatedResponse::new(items, query, total))
    }
}
