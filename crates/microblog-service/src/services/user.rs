//! User service
//!
//! Profiles, the user index, profile edits, admin deletion and the
//! following/followers listings.

use microblog_common::auth::hash_password;
use microblog_core::entities::{normalize_email, User};
use microblog_core::{DomainError, PageQuery, UserId};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{
    CurrentUserResponse, PaginatedResponse, ProfileCounts, ProfileResponse, UpdateUserRequest,
    UserResponse,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Get current authenticated user (private view)
    #[instrument(skip(self))]
    pub async fn get_current_user(&self, user_id: UserId) -> ServiceResult<CurrentUserResponse> {
        let user = self.ctx.require_user(user_id).await?;
        Ok(CurrentUserResponse::from(&user))
    }

    /// Public profile. Unactivated accounts are hidden.
    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: UserId) -> ServiceResult<ProfileResponse> {
        let user = self.find_activated(user_id).await?;

        let counts = ProfileCounts {
            microposts: self.ctx.micropost_repo().count_by_user(user.id).await?,
            following: self.ctx.relationship_repo().count_following(user.id).await?,
            followers: self.ctx.relationship_repo().count_followers(user.id).await?,
        };

        Ok(ProfileResponse::new(&user, counts))
    }

    /// Activated users ordered by id
    #[instrument(skip(self))]
    pub async fn list_users(&self, query: PageQuery) -> ServiceResult<PaginatedResponse<UserResponse>> {
        let users = self.ctx.user_repo().list_activated(query).await?;
        let total = self.ctx.user_repo().count_activated().await?;

        Ok(PaginatedResponse::new(
            users.iter().map(UserResponse::from).collect(),
            query,
            total,
        ))
    }

    /// Edit a profile. Only the owner may do this.
    #[instrument(skip(self, request))]
    pub async fn update_user(
        &self,
        actor_id: UserId,
        user_id: UserId,
        request: UpdateUserRequest,
    ) -> ServiceResult<CurrentUserResponse> {
        if actor_id != user_id {
            return Err(DomainError::NotAccountOwner.into());
        }
        request.validate()?;

        let mut user = self.ctx.require_user(user_id).await?;
        let mut changed = false;

        if let Some(name) = request.name {
            if name.trim() != user.name {
                user.set_name(name);
                changed = true;
            }
        }

        if let Some(email) = request.email {
            let email = normalize_email(&email);
            if email != user.email {
                if self.ctx.user_repo().email_exists(&email, Some(user.id)).await? {
                    return Err(DomainError::EmailAlreadyExists.into());
                }
                user.set_email(&email);
                changed = true;
            }
        }

        if changed {
            self.ctx.user_repo().update_profile(&user).await?;
            info!(user_id = %user_id, "User profile updated");
        }

        if let Some(password) = request.password {
            let password_hash = hash_password(&password)?;
            self.ctx
                .user_repo()
                .update_password(user.id, &password_hash)
                .await?;
            info!(user_id = %user_id, "Password changed");
        }

        Ok(CurrentUserResponse::from(&user))
    }

    /// Delete an account with its microposts and follow edges.
    /// Admin only, and never the admin's own account.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, actor_id: UserId, user_id: UserId) -> ServiceResult<()> {
        let actor = self.ctx.require_user(actor_id).await?;
        if !actor.is_admin() {
            return Err(DomainError::NotAdmin.into());
        }
        if actor_id == user_id {
            return Err(DomainError::CannotDeleteSelf.into());
        }

        let microposts = self.ctx.user_repo().delete(user_id).await?;
        info!(user_id = %user_id, deleted_by = %actor_id, microposts, "User deleted");

        Ok(())
    }

    /// Users that `user_id` follows
    #[instrument(skip(self))]
    pub async fn following(
        &self,
        user_id: UserId,
        query: PageQuery,
    ) -> ServiceResult<PaginatedResponse<UserResponse>> {
        let user = self.ctx.require_user(user_id).await?;
        let users = self.ctx.relationship_repo().following(user.id, query).await?;
        let total = self.ctx.relationship_repo().count_following(user.id).await?;

        Ok(PaginatedResponse::new(
            users.iter().map(UserResponse::from).collect(),
            query,
            total,
        ))
    }

    /// Users following `user_id`
    #[instrument(skip(self))]
    pub async fn followers(
        &self,
        user_id: UserId,
        query: PageQuery,
    ) -> ServiceResult<PaginatedResponse<UserResponse>> {
        let user = self.ctx.require_user(user_id).await?;
        let users = self.ctx.relationship_repo().followers(user.id, query).await?;
        let total = self.ctx.relationship_repo().count_followers(user.id).await?;

        Ok(PaginatedResponse::new(
            users.iter().map(UserResponse::from).collect(),
            query,
            total,
        ))
    }

    async fn find_activated(&self, user_id: UserId) -> ServiceResult<User> {
        let user = self.ctx.require_user(user_id).await?;
        if !user.is_activated() {
            return Err(DomainError::UserNotFound(user_id).into());
        }
        Ok(user)
    }
}
