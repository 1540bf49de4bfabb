//! Ordered request pipeline.
//!
//! The middleware order is data: [`LAYER_STAGES`] lists the stages from
//! outermost to innermost and [`assemble`] folds them onto the router, so the
//! first stage listed is the first to see a request and the last to see its
//! response.
//!
//! ```text
//! request
//!   → RequestId → Trace → ErrorTranslation → PanicCapture
//!   → OriginPolicy → CorsHeaders → BodyParsing → CookieParsing
//!   → RequestLogging → router (/health, /api/*, static, 404)
//! ```

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, DefaultBodyLimit};
use axum::http::Request;
use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::http::middleware::{body, cookies, cors, errors, logging};
use crate::http::middleware::{BodyLimit, CorsPolicy, ErrorPolicy};
use crate::http::request::RequestExt;

/// One middleware stage of the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Assign and echo `x-request-id`.
    RequestId,
    /// Request span and latency logging.
    Trace,
    /// Render every `ApiError` into the final response.
    ErrorTranslation,
    /// Turn handler panics into `ApiError::Panic`.
    PanicCapture,
    /// Reject disallowed origins; preflight answers become 204.
    OriginPolicy,
    /// Write CORS headers and answer preflights.
    CorsHeaders,
    /// Cap and decode JSON and form bodies.
    BodyParsing,
    /// Decode cookies.
    CookieParsing,
    /// Log method, path and origin.
    RequestLogging,
}

/// Stages from outermost to innermost.
pub const LAYER_STAGES: [Stage; 9] = [
    Stage::RequestId,
    Stage::Trace,
    Stage::ErrorTranslation,
    Stage::PanicCapture,
    Stage::OriginPolicy,
    Stage::CorsHeaders,
    Stage::BodyParsing,
    Stage::CookieParsing,
    Stage::RequestLogging,
];

/// Per-stage state, built once from the configuration.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub cors: CorsPolicy,
    pub body_limit: BodyLimit,
    pub errors: ErrorPolicy,
}

impl PipelineContext {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            cors: CorsPolicy::new(config.cors.clone()),
            body_limit: BodyLimit(config.body.limit_bytes),
            errors: ErrorPolicy {
                development: config.is_development(),
            },
        }
    }
}

impl Stage {
    /// Wrap `router` in this stage.
    pub fn install(self, router: Router, ctx: &PipelineContext) -> Router {
        match self {
            Stage::RequestId => router.layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            ),
            Stage::Trace => router.layer(TraceLayer::new_for_http().make_span_with(request_span)),
            Stage::ErrorTranslation => router.layer(middleware::from_fn_with_state(
                ctx.errors,
                errors::translate_errors,
            )),
            Stage::PanicCapture => router.layer(CatchPanicLayer::custom(errors::panic_response)),
            Stage::OriginPolicy => router.layer(middleware::from_fn_with_state(
                ctx.cors.clone(),
                cors::enforce_origin,
            )),
            Stage::CorsHeaders => router.layer(ctx.cors.layer()),
            Stage::BodyParsing => router
                .layer(DefaultBodyLimit::max(ctx.body_limit.0))
                .layer(middleware::from_fn_with_state(ctx.body_limit, body::parse_body)),
            Stage::CookieParsing => router.layer(middleware::from_fn(cookies::parse_cookies)),
            Stage::RequestLogging => router.layer(middleware::from_fn(logging::log_requests)),
        }
    }
}

/// Wrap `router` in every stage of `stages`, first stage outermost.
pub fn assemble(router: Router, stages: &[Stage], ctx: &PipelineContext) -> Router {
    stages
        .iter()
        .rev()
        .fold(router, |router, stage| stage.install(router, ctx))
}

fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request.request_id().unwrap_or("unknown");
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
        peer = %peer,
    )
}
