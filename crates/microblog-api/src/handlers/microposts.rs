//! Micropost handlers

use axum::{extract::State, Json};
use microblog_service::dto::{CreateMicropostRequest, MicropostResponse};
use microblog_service::MicropostService;

use crate::extractors::{ApiPath, AuthUser, MicropostIdPath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Post a micropost
///
/// POST /microposts
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateMicropostRequest>,
) -> ApiResult<Created<Json<MicropostResponse>>> {
    let service = MicropostService::new(state.service_context());
    let response = service.create(auth.user_id, request).await?;
    Ok(Created(Json(response)))
}

/// Delete one of your microposts
///
/// DELETE /microposts/{micropost_id}
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<MicropostIdPath>,
) -> ApiResult<NoContent> {
    let service = MicropostService::new(state.service_context());
    service.delete(auth.user_id, path.micropost_id()?).await?;
    Ok(NoContent)
}
