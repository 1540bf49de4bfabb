//! Response bodies shared by the gateway's own responses.
//!
//! # Responsibilities
//! - Error body `{success:false, msg, [stack, path, method]}`
//! - Not-found body `{success:false, msg, path, method}`
//! - The 404 fallback handler

use axum::extract::OriginalUri;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Message sent for unknown routes.
pub const NOT_FOUND_MSG: &str = "Ruta no encontrada";

/// Message sent for any error outside development mode.
pub const GENERIC_ERROR_MSG: &str = "Error interno del servidor";

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl ErrorBody {
    /// Production body: no internals.
    pub fn generic() -> Self {
        Self {
            success: false,
            msg: GENERIC_ERROR_MSG.to_string(),
            stack: None,
            path: None,
            method: None,
        }
    }

    /// Development body: raw message plus diagnostics.
    pub fn detailed(msg: String, stack: String, path: &str, method: &Method) -> Self {
        Self {
            success: false,
            msg,
            stack: Some(stack),
            path: Some(path.to_string()),
            method: Some(method.to_string()),
        }
    }
}

/// Body of the 404 fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotFoundBody {
    pub success: bool,
    pub msg: &'static str,
    pub path: String,
    pub method: String,
}

impl NotFoundBody {
    pub fn new(path: &str, method: &Method) -> Self {
        Self {
            success: false,
            msg: NOT_FOUND_MSG,
            path: path.to_string(),
            method: method.to_string(),
        }
    }
}

/// Fallback for paths no route or static file claims.
pub async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> Response {
    tracing::warn!(method = %method, path = %uri.path(), "Route not found");
    (StatusCode::NOT_FOUND, Json(NotFoundBody::new(uri.path(), &method))).into_response()
}
