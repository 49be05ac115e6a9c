//! Account handlers
//!
//! Signup and account activation.

use axum::{
    extract::{Query, State},
    Json,
};
use microblog_service::dto::{AuthResponse, EmailQuery, SignupRequest, SignupResponse};
use microblog_service::AccountService;

use crate::extractors::{ApiPath, TokenPath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Sign up for an account
///
/// POST /users
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> ApiResult<Created<Json<SignupResponse>>> {
    let service = AccountService::new(state.service_context());
    let response = service.signup(request).await?;
    Ok(Created(Json(response)))
}

/// Follow the emailed activation link
///
/// GET /account_activations/{token}/edit?email=
pub async fn activate(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<TokenPath>,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Json<AuthResponse>> {
    let service = AccountService::new(state.service_context());
    let response = service.activate(&path.token, &query.email).await?;
    Ok(Json(response))
}
