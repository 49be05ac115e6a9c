//! Password reset handlers

use axum::{
    extract::{Query, State},
    Json,
};
use microblog_service::dto::{
    AuthResponse, EmailQuery, MessageResponse, PasswordResetRequest, ResetPasswordRequest,
};
use microblog_service::PasswordResetService;

use crate::extractors::{ApiJson, ApiPath, TokenPath, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Mail a reset link
///
/// POST /password_resets
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<PasswordResetRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = PasswordResetService::new(state.service_context());
    let response = service.request_reset(request).await?;
    Ok(Json(response))
}

/// Check a reset link before showing the form
///
/// GET /password_resets/{token}/edit?email=
pub async fn edit(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<TokenPath>,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Json<MessageResponse>> {
    let service = PasswordResetService::new(state.service_context());
    let user = service.check_link(&path.token, &query.email).await?;
    Ok(Json(MessageResponse::new(format!(
        "Choose a new password for {}",
        user.email
    ))))
}

/// Set the new password
///
/// PATCH /password_resets/{token}
pub async fn update(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<TokenPath>,
    ApiJson(request): ApiJson<ResetPasswordRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let service = PasswordResetService::new(state.service_context());
    let response = service.reset(&path.token, request).await?;
    Ok(Json(response))
}
