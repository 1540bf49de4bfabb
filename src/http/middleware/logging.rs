//! Per-request logging.
//!
//! Logs method, path and origin before dispatch and records the request
//! metric afterwards. Never alters the response.

use std::time::Instant;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;

use crate::http::request::RequestExt;
use crate::observability::metrics;
use crate::routing::{Matcher, RouteGroup};

pub const NO_ORIGIN: &str = "No Origin";

/// Origin as logged; `No Origin` when absent or not text.
pub fn origin_label(headers: &HeaderMap) -> &str {
    headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(NO_ORIGIN)
}

pub async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let origin = origin_label(request.headers()).to_string();
    let group = RouteGroup::ALL
        .iter()
        .find(|g| g.matcher().matches(&request))
        .map(|g| g.prefix())
        .unwrap_or("-");
    let request_id = request.request_id().unwrap_or("-").to_string();

    tracing::info!(
        method = %method,
        path = %path,
        origin = %origin,
        group,
        request_id = %request_id,
        "Incoming request"
    );

    let response = next.run(request).await;
    metrics::record_request(method.as_str(), response.status().as_u16(), started);
    response
}
