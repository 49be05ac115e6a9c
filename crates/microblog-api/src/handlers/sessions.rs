//! Session handlers
//!
//! Login, logout and remember-me session restore.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use microblog_common::AppError;
use microblog_service::dto::{AuthResponse, LoginRequest};
use microblog_service::SessionService;

use crate::cookies;
use crate::extractors::{ApiJson, AuthUser};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Log in with email and password
///
/// POST /sessions
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let service = SessionService::new(state.service_context());
    let outcome = service.login(request).await?;

    let user_id = outcome.user_id();
    let jar = match outcome.remember_token {
        Some(token) => cookies::remember(jar, user_id, token, state.secure_cookies()),
        None => cookies::forget(jar),
    };

    Ok((jar, Json(outcome.auth)))
}

/// Start a session from remember-me cookies
///
/// POST /sessions/remembered
pub async fn restore(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<Json<AuthResponse>> {
    let (user_id, token) = cookies::remembered(&jar).ok_or(AppError::InvalidToken)?;

    let service = SessionService::new(state.service_context());
    let response = service.restore(user_id, &token).await?;
    Ok(Json(response))
}

/// Log out and forget this browser
///
/// DELETE /sessions
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
) -> ApiResult<(CookieJar, NoContent)> {
    let service = SessionService::new(state.service_context());
    service.logout(auth.user_id).await?;
    Ok((cookies::forget(jar), NoContent))
}
