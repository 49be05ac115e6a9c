//! Feed handler

use axum::{extract::State, Json};
use microblog_service::dto::{MicropostResponse, PaginatedResponse};
use microblog_service::FeedService;

use crate::extractors::{AuthUser, Pagination};
use crate::response::ApiResult;
use crate::state::AppState;

/// The current user's home timeline
///
/// GET /feed
pub async fn feed(
    State(state): State<AppState>,
    auth: AuthUser,
    Pagination(query): Pagination,
) -> ApiResult<Json<PaginatedResponse<MicropostResponse>>> {
    let service = FeedService::new(state.service_context());
    let response = service.feed(auth.user_id, query).await?;
    Ok(Json(response))
}
