//! Centralized error translation.
//!
//! The terminal stage for every pipeline failure. Responses tagged with an
//! [`ErrorReport`] are logged with a timestamp and re-rendered according to the
//! environment. Untagged error responses that are not JSON (axum rejections,
//! missing extensions) are wrapped into an [`ApiError`] first, so clients only
//! ever see the gateway's error shape. Everything else passes through untouched.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;

use crate::http::error::{ApiError, ErrorReport};
use crate::http::response::ErrorBody;
use crate::observability::logging::panic_message;

/// Whether clients may see error internals.
#[derive(Debug, Clone, Copy)]
pub struct ErrorPolicy {
    pub development: bool,
}

pub async fn translate_errors(
    State(policy): State<ErrorPolicy>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    if let Some(report) = response.extensions_mut().remove::<ErrorReport>() {
        return render(policy, report, &method, &path, response.headers());
    }
    if !is_untranslated_error(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let message = rejection_message(parts.status, body).await;
    let report = ErrorReport::from(&ApiError::new(parts.status, message));
    render(policy, report, &method, &path, &parts.headers)
}

/// Upper bound on the text read from a framework rejection body.
const REJECTION_TEXT_LIMIT: usize = 64 * 1024;

/// An error status whose body is not already JSON.
fn is_untranslated_error(response: &Response) -> bool {
    let status = response.status();
    (status.is_client_error() || status.is_server_error()) && !is_json(response.headers())
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let essence = ct.split(';').next().unwrap_or_default().trim();
            essence.eq_ignore_ascii_case("application/json") || essence.ends_with("+json")
        })
        .unwrap_or(false)
}

async fn rejection_message(status: StatusCode, body: Body) -> String {
    let text = axum::body::to_bytes(body, REJECTION_TEXT_LIMIT)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();
    if text.is_empty() {
        status.canonical_reason().unwrap_or("Error").to_string()
    } else {
        text
    }
}

fn render(
    policy: ErrorPolicy,
    report: ErrorReport,
    method: &Method,
    path: &str,
    original_headers: &HeaderMap,
) -> Response {
    let timestamp = Utc::now().to_rfc3339();
    tracing::error!(
        timestamp = %timestamp,
        status = report.status.as_u16(),
        method = %method,
        path = %path,
        error = %report.message,
        stack = %report.stack,
        "Request failed"
    );

    let body = if policy.development {
        ErrorBody::detailed(report.message, report.stack, path, method)
    } else {
        ErrorBody::generic()
    };

    let mut rendered = (report.status, Json(body)).into_response();
    // Keep headers set on the way out (CORS, request id, cookies).
    for (name, value) in original_headers {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            rendered.headers_mut().append(name.clone(), value.clone());
        }
    }
    rendered
}

/// Response for a panicking handler, fed back into `translate_errors`.
pub fn panic_response(payload: Box<dyn std::any::Any + Send + 'static>) -> Response {
    ApiError::Panic(panic_message(payload.as_ref())).into_response()
}
