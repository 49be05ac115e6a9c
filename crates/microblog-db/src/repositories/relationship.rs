//! PostgreSQL implementation of RelationshipRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use microblog_core::entities::{FollowEdge, Relationship, User};
use microblog_core::error::DomainError;
use microblog_core::traits::{PageQuery, RelationshipRepository, RepoResult};
use microblog_core::value_objects::UserId;

use crate::models::{RelationshipModel, UserModel};

use super::error::{map_constraint_violation, map_db_error, user_not_found};

/// PostgreSQL implementation of RelationshipRepository
#[derive(Clone)]
pub struct PgRelationshipRepository {
    pool: PgPool,
}

impl PgRelationshipRepository {
    /// Create a new PgRelationshipRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationshipRepository for PgRelationshipRepository {
    #[instrument(skip(self))]
    async fn follow(&self, edge: FollowEdge) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO relationships (follower_id, followed_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followed_id) DO NOTHING
            ",
        )
        .bind(edge.follower_id.into_inner())
        .bind(edge.followed_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_constraint_violation(
                e,
                || user_not_found(edge.followed_id),
                || DomainError::CannotFollowSelf,
            )
        })?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn unfollow(&self, follower_id: UserId, followed_id: UserId) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM relationships WHERE follower_id = $1 AND followed_id = $2
            ",
        )
        .bind(follower_id.into_inner())
        .bind(followed_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn find(
        &self,
        follower_id: UserId,
        followed_id: UserId,
    ) -> RepoResult<Option<Relationship>> {
        let result = sqlx::query_as::<_, RelationshipModel>(
            r"
            SELECT follower_id, followed_id, created_at
            FROM relationships
            WHERE follower_id = $1 AND followed_id = $2
            ",
        )
        .bind(follower_id.into_inner())
        .bind(followed_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Relationship::from))
    }

    #[instrument(skip(self))]
    async fn following(&self, user_id: UserId, query: PageQuery) -> RepoResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserModel>(
            r"
            SELECT u.id, u.name, u.email, u.admin, u.activated, u.activated_at,
                   u.activation_digest, u.remember_digest, u.reset_digest, u.reset_sent_at,
                   u.created_at, u.updated_at
            FROM users u
            INNER JOIN relationships r ON r.followed_id = u.id
            WHERE r.follower_id = $1
            ORDER BY r.created_at DESC, u.id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id.into_inner())
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self))]
    async fn followers(&self, user_id: UserId, query: PageQuery) -> RepoResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserModel>(
            r"
            SELECT u.id, u.name, u.email, u.admin, u.activated, u.activated_at,
                   u.activation_digest, u.remember_digest, u.reset_digest, u.reset_sent_at,
                   u.created_at, u.updated_at
            FROM users u
            INNER JOIN relationships r ON r.follower_id = u.id
            WHERE r.followed_id = $1
            ORDER BY r.created_at DESC, u.id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id.into_inner())
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_following(&self, user_id: UserId) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM relationships WHERE follower_id = $1")
            .bind(user_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn count_followers(&self, user_id: UserId) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM relationships WHERE followed_id = $1")
            .bind(user_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}
