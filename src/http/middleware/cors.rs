//! Cross-origin policy.
//!
//! Two stages share one [`CorsPolicy`]:
//! - `enforce_origin` rejects requests whose Origin is not allowed and turns
//!   preflight answers into 204
//! - `CorsPolicy::layer` (tower-http) writes the CORS response headers and
//!   answers preflights without reaching the routes

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderName, HeaderValue, Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsConfig;
use crate::http::error::ApiError;
use crate::observability::metrics;

pub const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
    Method::PATCH,
];

pub const ALLOWED_HEADERS: [HeaderName; 5] = [
    header::CONTENT_TYPE,
    header::AUTHORIZATION,
    HeaderName::from_static("x-requested-with"),
    header::ACCEPT,
    header::ORIGIN,
];

/// Outcome of checking a request's Origin header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginDecision {
    /// No Origin header (curl, mobile apps, server-to-server).
    NoOrigin,
    Allowed,
    Rejected(String),
}

/// Immutable allow list consulted on every request.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    config: Arc<CorsConfig>,
}

impl CorsPolicy {
    pub fn new(config: CorsConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.config.allowed_origins
    }

    pub fn check(&self, origin: Option<&HeaderValue>) -> OriginDecision {
        let Some(value) = origin else {
            return OriginDecision::NoOrigin;
        };
        match value.to_str() {
            Ok(origin) if self.config.is_allowed(origin) => OriginDecision::Allowed,
            Ok(origin) => OriginDecision::Rejected(origin.to_string()),
            Err(_) => OriginDecision::Rejected(String::from_utf8_lossy(value.as_bytes()).into_owned()),
        }
    }

    /// Header-writing layer for the same allow list.
    pub fn layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .config
            .allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = %o, "Skipping origin that is not a valid header value");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(ALLOWED_METHODS.to_vec())
            .allow_headers(ALLOWED_HEADERS.to_vec())
            .allow_credentials(true)
    }
}

/// Reject disallowed origins before any other stage sees the request.
pub async fn enforce_origin(
    State(policy): State<CorsPolicy>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if let OriginDecision::Rejected(origin) = policy.check(request.headers().get(header::ORIGIN)) {
        tracing::warn!(origin = %origin, "Origin blocked by CORS");
        metrics::record_cors_rejection();
        return Err(ApiError::CorsRejected { origin });
    }

    let preflight = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if preflight && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    Ok(response)
}
