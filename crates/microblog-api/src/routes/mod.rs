//! Route definitions
//!
//! All API routes organized by resource and mounted under /api/v1.

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::handlers::{
    accounts, feed, health, microposts, password_resets, relationships, sessions, users,
};
use crate::state::AppState;

/// Create the main API router with all routes (excluding health for separate middleware handling)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(account_routes())
        .merge(session_routes())
        .merge(user_routes())
        .merge(micropost_routes())
        .merge(relationship_routes())
        .route("/feed", get(feed::feed))
}

/// Activation and password reset links
fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/account_activations/:token/edit", get(accounts::activate))
        .route("/password_resets", post(password_resets::create))
        .route("/password_resets/:token/edit", get(password_resets::edit))
        .route("/password_resets/:token", patch(password_resets::update))
}

/// Login, logout and remember-me
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(sessions::login).delete(sessions::logout))
        .route("/sessions/remembered", post(sessions::restore))
}

/// User routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::index).post(accounts::signup))
        .route("/users/me", get(users::me))
        .route(
            "/users/:user_id",
            get(users::show).patch(users::update).delete(users::destroy),
        )
        .route("/users/:user_id/microposts", get(users::microposts))
        .route("/users/:user_id/following", get(users::following))
        .route("/users/:user_id/followers", get(users::followers))
}

/// Micropost routes
fn micropost_routes() -> Router<AppState> {
    Router::new()
        .route("/microposts", post(microposts::create))
        .route("/microposts/:micropost_id", delete(microposts::destroy))
}

/// Relationship routes
fn relationship_routes() -> Router<AppState> {
    Router::new()
        .route("/relationships", post(relationships::create))
        .route(
            "/relationships/:followed_id",
            get(relationships::show).delete(relationships::destroy),
        )
}
