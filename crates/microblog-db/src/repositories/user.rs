//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, instrument};

use microblog_core::entities::{NewUser, User};
use microblog_core::error::DomainError;
use microblog_core::traits::{PageQuery, RepoResult, UserRepository};
use microblog_core::value_objects::UserId;

use crate::models::UserModel;

use super::error::{map_db_error, map_unique_violation, user_not_found};

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn expect_row(rows_affected: u64, id: UserId) -> RepoResult<()> {
        if rows_affected == 0 {
            return Err(user_not_found(id));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, name, email, admin, activated, activated_at, activation_digest,
                   remember_digest, reset_digest, reset_sent_at, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, name, email, admin, activated, activated_at, activation_digest,
                   remember_digest, reset_digest, reset_sent_at, created_at, updated_at
            FROM users
            WHERE lower(email) = lower($1)
            ",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str, except: Option<UserId>) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE lower(email) = lower($1) AND ($2::BIGINT IS NULL OR id <> $2)
            )
            ",
        )
        .bind(email.trim())
        .bind(except.map(UserId::into_inner))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self, user, password_hash), fields(email = %user.email))]
    async fn create(&self, user: &NewUser, password_hash: &str) -> RepoResult<User> {
        let model = sqlx::query_as::<_, UserModel>(
            r"
            INSERT INTO users (name, email, password_digest, admin, activation_digest)
            VALUES ($1, lower($2), $3, $4, $5)
            RETURNING id, name, email, admin, activated, activated_at, activation_digest,
                      remember_digest, reset_digest, reset_sent_at, created_at, updated_at
            ",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(password_hash)
        .bind(user.admin)
        .bind(&user.activation_digest)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::EmailAlreadyExists))?;

        Ok(User::from(model))
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update_profile(&self, user: &User) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET name = $2, email = lower($3), updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.name)
        .bind(&user.email)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::EmailAlreadyExists))?;

        Self::expect_row(result.rows_affected(), user.id)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: UserId) -> RepoResult<u64> {
        // Posts are removed explicitly so the count can be reported.
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let microposts = sqlx::query("DELETE FROM microposts WHERE user_id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        sqlx::query("DELETE FROM relationships WHERE follower_id = $1 OR followed_id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        // Dropping `tx` without committing rolls everything back.
        Self::expect_row(result.rows_affected(), id)?;

        tx.commit().await.map_err(map_db_error)?;

        info!(user_id = %id, microposts, "User deleted");
        Ok(microposts)
    }

    #[instrument(skip(self))]
    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>> {
        let result = sqlx::query_scalar::<_, String>(
            r"
            SELECT password_digest FROM users WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET password_digest = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Self::expect_row(result.rows_affected(), id)
    }

    #[instrument(skip(self, digest))]
    async fn update_remember_digest(&self, id: UserId, digest: Option<&str>) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users SET remember_digest = $2 WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(digest)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Self::expect_row(result.rows_affected(), id)
    }

    #[instrument(skip(self))]
    async fn activate(&self, id: UserId, activated_at: DateTime<Utc>) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET activated = TRUE, activated_at = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(activated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Self::expect_row(result.rows_affected(), id)
    }

    #[instrument(skip(self, digest))]
    async fn update_reset_digest(
        &self,
        id: UserId,
        digest: Option<&str>,
        sent_at: Option<DateTime<Utc>>,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users SET reset_digest = $2, reset_sent_at = $3 WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(digest)
        .bind(sent_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Self::expect_row(result.rows_affected(), id)
    }

    #[instrument(skip(self))]
    async fn set_admin(&self, id: UserId, admin: bool) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users SET admin = $2, updated_at = NOW() WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(admin)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Self::expect_row(result.rows_affected(), id)
    }

    #[instrument(skip(self))]
    async fn list_activated(&self, query: PageQuery) -> RepoResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, name, email, admin, activated, activated_at, activation_digest,
                   remember_digest, reset_digest, reset_sent_at, created_at, updated_at
            FROM users
            WHERE activated = TRUE
            ORDER BY id
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_activated(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE activated = TRUE")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}
