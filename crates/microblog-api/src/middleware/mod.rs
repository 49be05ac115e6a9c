//! HTTP middleware
//!
//! Every response carries an `x-request-id`, every request gets a tracing
//! span, slow handlers are cut off with a 503, and bodies are gzip-compressed.
//! The `/api/v1` routes are additionally rate limited.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use microblog_common::{AppError, CorsConfig, RateLimitConfig};
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer,
};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, MakeSpan, TraceLayer},
};
use tracing::{info, warn, Level, Span};

use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Handlers running longer than this are answered with 503
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn request_id_header() -> HeaderName {
    HeaderName::from_static(REQUEST_ID_HEADER)
}

/// Span per request, tagged with the id assigned by `SetRequestIdLayer`
#[derive(Debug, Clone, Copy)]
struct RequestSpan;

impl MakeSpan<Body> for RequestSpan {
    fn make_span(&mut self, request: &Request<Body>) -> Span {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            path = %request.uri().path(),
            request_id = %request_id,
        )
    }
}

fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestSpan> {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

/// Wrap `router` in the shared stack. Layers listed first run first.
pub fn apply_middleware(
    router: Router<AppState>,
    cors_config: &CorsConfig,
    is_production: bool,
) -> Router<AppState> {
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
            .layer(PropagateRequestIdLayer::new(request_id_header()))
            .layer(trace_layer())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::SERVICE_UNAVAILABLE,
                REQUEST_TIMEOUT,
            ))
            .layer(CompressionLayer::new())
            .layer(cors_layer(CorsPolicy::from_config(cors_config, is_production))),
    )
}

/// Throttle `router` with one bucket shared by all clients
///
/// # Errors
/// Returns `AppError::Config` if the limits are zero
pub fn apply_rate_limit(
    router: Router<AppState>,
    limits: &RateLimitConfig,
) -> Result<Router<AppState>, AppError> {
    if limits.requests_per_second == 0 {
        return Err(AppError::Config(
            "RATE_LIMIT_REQUESTS_PER_SECOND must be non-zero".to_string(),
        ));
    }

    // One token comes back every 1/rps seconds
    let config = GovernorConfigBuilder::default()
        .period(Duration::from_secs(1) / limits.requests_per_second)
        .burst_size(limits.burst)
        .key_extractor(GlobalKeyExtractor)
        .finish()
        .ok_or_else(|| AppError::Config("rate limit values must be non-zero".to_string()))?;

    Ok(router.layer(GovernorLayer {
        config: Arc::new(config),
    }))
}

/// Which browser origins may call the API
#[derive(Debug, Clone, PartialEq, Eq)]
enum CorsPolicy {
    /// Development without configuration: any origin, no cookies
    AnyOrigin,
    /// Listed origins, with credentials so remember-me cookies work
    Listed(Vec<HeaderValue>),
    /// Production without configuration: no cross-origin access
    Closed,
}

impl CorsPolicy {
    fn from_config(config: &CorsConfig, is_production: bool) -> Self {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        match (origins.is_empty(), is_production) {
            (false, _) => Self::Listed(origins),
            (true, true) => Self::Closed,
            (true, false) => Self::AnyOrigin,
        }
    }
}

fn cors_layer(policy: CorsPolicy) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            request_id_header(),
        ])
        .expose_headers([request_id_header()]);

    match policy {
        CorsPolicy::Listed(origins) => {
            info!(origins = origins.len(), "CORS restricted to configured origins");
            layer
                .allow_origin(AllowOrigin::list(origins))
                .allow_credentials(true)
        }
        CorsPolicy::Closed => {
            warn!("CORS_ALLOWED_ORIGINS is empty; browsers on other origins will be refused");
            layer.allow_origin(AllowOrigin::list(Vec::<HeaderValue>::new()))
        }
        CorsPolicy::AnyOrigin => {
            warn!("CORS open to any origin; set CORS_ALLOWED_ORIGINS before deploying");
            layer.allow_origin(Any)
        }
    }
}
