//! User handlers
//!
//! Profiles, the user index, edits, admin deletion and follow listings.

use axum::{extract::State, Json};
use microblog_service::dto::{
    CurrentUserResponse, MicropostResponse, PaginatedResponse, ProfileResponse,
    UpdateUserRequest, UserResponse,
};
use microblog_service::{MicropostService, UserService};

use crate::extractors::{ApiPath, AuthUser, Pagination, UserIdPath, ValidatedJson};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// List activated users
///
/// GET /users
pub async fn index(
    State(state): State<AppState>,
    _auth: AuthUser,
    Pagination(query): Pagination,
) -> ApiResult<Json<PaginatedResponse<UserResponse>>> {
    let service = UserService::new(state.service_context());
    let response = service.list_users(query).await?;
    Ok(Json(response))
}

/// Get current user
///
/// GET /users/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<CurrentUserResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.get_current_user(auth.user_id).await?;
    Ok(Json(response))
}

/// Public profile
///
/// GET /users/{user_id}
pub async fn show(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<UserIdPath>,
) -> ApiResult<Json<ProfileResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.get_profile(path.user_id()?).await?;
    Ok(Json(response))
}

/// Edit own profile
///
/// PATCH /users/{user_id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<UserIdPath>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<CurrentUserResponse>> {
    let service = UserService::new(state.service_context());
    let response = service
        .update_user(auth.user_id, path.user_id()?, request)
        .await?;
    Ok(Json(response))
}

/// Delete a user (admin only)
///
/// DELETE /users/{user_id}
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<UserIdPath>,
) -> ApiResult<NoContent> {
    let service = UserService::new(state.service_context());
    service.delete_user(auth.user_id, path.user_id()?).await?;
    Ok(NoContent)
}

/// A user's microposts
///
/// GET /users/{user_id}/microposts
pub async fn microposts(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<UserIdPath>,
    Pagination(query): Pagination,
) -> ApiResult<Json<PaginatedResponse<MicropostResponse>>> {
    let service = MicropostService::new(state.service_context());
    let response = service.list_for_user(path.user_id()?, query).await?;
    Ok(Json(response))
}

/// Who a user follows
///
/// GET /users/{user_id}/following
pub async fn following(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(path): ApiPath<UserIdPath>,
    Pagination(query): Pagination,
) -> ApiResult<Json<PaginatedResponse<UserResponse>>> {
    let service = UserService::new(state.service_context());
    let response = service.following(path.user_id()?, query).await?;
    Ok(Json(response))
}

/// Who follows a user
///
/// GET /users/{user_id}/followers
pub async fn followers(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(path): ApiPath<UserIdPath>,
    Pagination(query): Pagination,
) -> ApiResult<Json<PaginatedResponse<UserResponse>>> {
    let service = UserService::new(state.service_context());
    let response = service.followers(path.user_id()?, query).await?;
    Ok(Json(response))
}
