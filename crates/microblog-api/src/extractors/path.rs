//! Path parameter extractors
//!
//! Type-safe extraction of ids and tokens from path parameters.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use microblog_core::{MicropostId, UserId};
use serde::de::DeserializeOwned;

use crate::response::ApiError;

/// Path extractor whose rejection renders as an `ApiError`
#[derive(Debug, Clone)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(inner) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        Ok(ApiPath(inner))
    }
}

/// Path parameters with user_id
#[derive(Debug, serde::Deserialize)]
pub struct UserIdPath {
    pub user_id: String,
}

impl UserIdPath {
    pub fn user_id(&self) -> Result<UserId, ApiError> {
        UserId::parse(&self.user_id).map_err(|_| ApiError::invalid_path("Invalid user_id format"))
    }
}

/// Path parameters with micropost_id
#[derive(Debug, serde::Deserialize)]
pub struct MicropostIdPath {
    pub micropost_id: String,
}

impl MicropostIdPath {
    pub fn micropost_id(&self) -> Result<MicropostId, ApiError> {
        MicropostId::parse(&self.micropost_id)
            .map_err(|_| ApiError::invalid_path("Invalid micropost_id format"))
    }
}

/// Path parameters with followed_id
#[derive(Debug, serde::Deserialize)]
pub struct FollowedIdPath {
    pub followed_id: String,
}

impl FollowedIdPath {
    pub fn followed_id(&self) -> Result<UserId, ApiError> {
        UserId::parse(&self.followed_id)
            .map_err(|_| ApiError::invalid_path("Invalid followed_id format"))
    }
}

/// Path parameters carrying an emailed token
#[derive(Debug, serde::Deserialize)]
pub struct TokenPath {
    pub token: String,
}
