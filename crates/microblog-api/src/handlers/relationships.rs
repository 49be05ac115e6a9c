//! Relationship handlers
//!
//! Follow, unfollow and follow-state lookups for the current user.

use axum::{extract::State, Json};
use microblog_service::dto::{FollowRequest, FollowResponse};
use microblog_service::RelationshipService;

use crate::extractors::{ApiJson, ApiPath, AuthUser, FollowedIdPath};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Follow a user
///
/// POST /relationships
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<FollowRequest>,
) -> ApiResult<Created<Json<FollowResponse>>> {
    let service = RelationshipService::new(state.service_context());
    let response = service.follow(auth.user_id, request).await?;
    Ok(Created(Json(response)))
}

/// Unfollow a user
///
/// DELETE /relationships/{followed_id}
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<FollowedIdPath>,
) -> ApiResult<Json<FollowResponse>> {
    let service = RelationshipService::new(state.service_context());
    let response = service.unfollow(auth.user_id, path.followed_id()?).await?;
    Ok(Json(response))
}

/// Whether the current user follows `followed_id`
///
/// GET /relationships/{followed_id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<FollowedIdPath>,
) -> ApiResult<Json<FollowResponse>> {
    let service = RelationshipService::new(state.service_context());
    let response = service.status(auth.user_id, path.followed_id()?).await?;
    Ok(Json(response))
}
