//! Request-scoped error type.
//!
//! Every per-request failure is an `ApiError`. Turning one into a response
//! only tags the response with an [`ErrorReport`]; the error translation
//! stage (`middleware::errors`) renders the final body, so route handlers
//! never write their own error payloads.

use std::error::Error as StdError;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::db::DbError;
use crate::http::response::ErrorBody;

pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Message sent for CORS rejections.
pub const CORS_REJECTED_MSG: &str = "No permitido por CORS";

/// Errors that can end a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request's Origin is not in the allow list.
    #[error("{}", CORS_REJECTED_MSG)]
    CorsRejected { origin: String },

    /// A JSON or form body exceeded the configured cap.
    #[error("request entity too large: body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// A JSON or form body could not be decoded.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// A route handler failed with an explicit status.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// A failure without a status of its own.
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A route handler panicked.
    #[error("handler panicked: {0}")]
    Panic(String),
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap any error; the status defaults to 500.
    pub fn from_error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        ApiError::Internal {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::CorsRejected { .. } => StatusCode::FORBIDDEN,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Status { status, .. } => *status,
            ApiError::Internal { .. } | ApiError::Panic(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::CorsRejected { .. } => "CorsRejected",
            ApiError::PayloadTooLarge { .. } => "PayloadTooLarge",
            ApiError::MalformedBody(_) => "MalformedBody",
            ApiError::Status { .. } => "Status",
            ApiError::Internal { .. } => "Internal",
            ApiError::Panic(_) => "Panic",
        }
    }

    /// Error kind and message followed by the cause chain, one cause per line.
    pub fn stack(&self) -> String {
        let mut out = format!("{}: {}", self.kind(), self);
        let mut source = self.source();
        while let Some(cause) = source {
            out.push_str("\n    caused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), rejection.body_text())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotConnected => ApiError::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
            other => ApiError::from_error(other),
        }
    }
}

/// What the translation stage needs to render an error response.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub message: String,
    pub stack: String,
}

impl From<&ApiError> for ErrorReport {
    fn from(err: &ApiError) -> Self {
        Self {
            status: err.status_code(),
            message: err.to_string(),
            stack: err.stack(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let report = ErrorReport::from(&self);
        // Generic body until the translation stage rewrites it.
        let mut response = (report.status, Json(ErrorBody::generic())).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let cors = ApiError::CorsRejected {
            origin: "http://evil.example".into(),
        };
        assert_eq!(cors.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(cors.to_string(), "No permitido por CORS");

        assert_eq!(
            ApiError::PayloadTooLarge { limit: 10 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(ApiError::MalformedBody("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::new(StatusCode::CONFLICT, "taken").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::internal("x").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn stack_includes_cause_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = ApiError::from_error(io);
        let stack = err.stack();
        assert!(stack.starts_with("Internal: disk on fire"));
        assert!(stack.contains("caused by: disk on fire"));
    }

    #[test]
    fn stack_has_no_middleware_frames() {
        let err = ApiError::CorsRejected {
            origin: "http://evil.example".into(),
        };
        assert_eq!(err.stack(), "CorsRejected: No permitido por CORS");
        assert_eq!(ErrorReport::from(&err).stack.lines().count(), 1);
    }

    #[test]
    fn into_response_tags_report() {
        let response = ApiError::new(StatusCode::UNAUTHORIZED, "token expired").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let report = response.extensions().get::<ErrorReport>().unwrap();
        assert_eq!(report.message, "token expired");
        assert_eq!(report.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn db_not_connected_is_unavailable() {
        let err = ApiError::from(DbError::NotConnected);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        let err = ApiError::from(DbError::CloseTimeout(10));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
