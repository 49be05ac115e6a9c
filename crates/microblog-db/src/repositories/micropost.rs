//! PostgreSQL implementation of MicropostRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use microblog_core::entities::{Micropost, NewMicropost};
use microblog_core::error::DomainError;
use microblog_core::traits::{MicropostRepository, PageQuery, RepoResult};
use microblog_core::value_objects::{MicropostId, UserId};

use crate::models::MicropostModel;

use super::error::{map_constraint_violation, map_db_error, micropost_not_found, user_not_found};

/// PostgreSQL implementation of MicropostRepository
#[derive(Clone)]
pub struct PgMicropostRepository {
    pool: PgPool,
}

impl PgMicropostRepository {
    /// Create a new PgMicropostRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MicropostRepository for PgMicropostRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: MicropostId) -> RepoResult<Option<Micropost>> {
        let result = sqlx::query_as::<_, MicropostModel>(
            r"
            SELECT id, user_id, content, created_at, updated_at
            FROM microposts
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Micropost::from))
    }

    #[instrument(skip(self, micropost), fields(user_id = %micropost.user_id))]
    async fn create(&self, micropost: &NewMicropost) -> RepoResult<Micropost> {
        let model = sqlx::query_as::<_, MicropostModel>(
            r"
            INSERT INTO microposts (user_id, content)
            VALUES ($1, $2)
            RETURNING id, user_id, content, created_at, updated_at
            ",
        )
        .bind(micropost.user_id.into_inner())
        .bind(&micropost.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_constraint_violation(
                e,
                || user_not_found(micropost.user_id),
                || DomainError::BlankContent,
            )
        })?;

        Ok(Micropost::from(model))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: MicropostId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM microposts WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(micropost_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: UserId, query: PageQuery) -> RepoResult<Vec<Micropost>> {
        let rows = sqlx::query_as::<_, MicropostModel>(
            r"
            SELECT id, user_id, content, created_at, updated_at
            FROM microposts
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id.into_inner())
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Micropost::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_by_user(&self, user_id: UserId) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM microposts WHERE user_id = $1")
            .bind(user_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn feed(&self, user_id: UserId, query: PageQuery) -> RepoResult<Vec<Micropost>> {
        let rows = sqlx::query_as::<_, MicropostModel>(
            r"
            SELECT id, user_id, content, created_at, updated_at
            FROM microposts
            WHERE user_id = $1
               OR user_id IN (SELECT followed_id FROM relationships WHERE follower_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id.into_inner())
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Micropost::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_feed(&self, user_id: UserId) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM microposts
            WHERE user_id = $1
               OR user_id IN (SELECT followed_id FROM relationships WHERE follower_id = $1)
            ",
        )
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
