//! Micropost service
//!
//! Posting, deleting and per-user listings.

use microblog_core::entities::NewMicropost;
use microblog_core::{DomainError, MicropostId, PageQuery, UserId};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{CreateMicropostRequest, MicropostResponse, PaginatedResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Micropost service
pub struct MicropostService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MicropostService<'a> {
    /// Create a new MicropostService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Post as `author_id`
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        author_id: UserId,
        request: CreateMicropostRequest,
    ) -> ServiceResult<MicropostResponse> {
        request.validate()?;

        let author = self.ctx.require_user(author_id).await?;
        let new_post = NewMicropost::new(author.id, request.content)?;
        let micropost = self.ctx.micropost_repo().create(&new_post).await?;

        info!(micropost_id = %micropost.id, user_id = %author.id, "Micropost created");

        Ok(MicropostResponse::new(micropost, &author))
    }

    /// Delete a post. Only its author may.
    #[instrument(skip(self))]
    pub async fn delete(&self, actor_id: UserId, micropost_id: MicropostId) -> ServiceResult<()> {
        let micropost = self
            .ctx
            .micropost_repo()
            .find_by_id(micropost_id)
            .await?
            .ok_or(DomainError::MicropostNotFound(micropost_id))?;

        if !micropost.is_authored_by(actor_id) {
            warn!(micropost_id = %micropost_id, user_id = %actor_id, "Delete refused: not the author");
            return Err(DomainError::NotMicropostAuthor.into());
        }

        self.ctx.micropost_repo().delete(micropost.id).await?;
        info!(micropost_id = %micropost_id, "Micropost deleted");

        Ok(())
    }

    /// A user's posts, newest first
    #[instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        query: PageQuery,
    ) -> ServiceResult<PaginatedResponse<MicropostResponse>> {
        let author = self.ctx.require_user(user_id).await?;
        let posts = self.ctx.micropost_repo().find_by_user(author.id, query).await?;
        let total = self.ctx.micropost_repo().count_by_user(author.id).await?;

        Ok(PaginatedResponse::new(
            posts
                .into_iter()
                .map(|post| MicropostResponse::new(post, &author))
                .collect(),
            query,
            total,
        ))
    }
}
