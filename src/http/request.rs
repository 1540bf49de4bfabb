//! Request-scoped values added by the pipeline.
//!
//! # Responsibilities
//! - Expose the request id, decoded body and cookies to handlers and
//!   middleware without each one digging through extensions
//!
//! # Design Decisions
//! - The request id is the one assigned by the outermost stage, so log
//!   lines and the echoed `x-request-id` header always agree

use axum::http::request::Parts;
use axum::http::Request;
use serde_json::Value;
use tower_http::request_id::RequestId;

use crate::http::middleware::{Cookies, ParsedBody};

/// Header carrying the request id, both ways.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Accessors for values the pipeline attaches to a request.
pub trait RequestExt {
    fn extensions_ref(&self) -> &axum::http::Extensions;

    /// Id assigned by the request id stage, if it ran.
    fn request_id(&self) -> Option<&str> {
        self.extensions_ref()
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
    }

    /// Decoded JSON or form body.
    fn parsed_body(&self) -> Option<&Value> {
        self.extensions_ref()
            .get::<ParsedBody>()
            .map(|ParsedBody(value)| value)
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.extensions_ref().get::<Cookies>()?.get(name)
    }
}

impl<B> RequestExt for Request<B> {
    fn extensions_ref(&self) -> &axum::http::Extensions {
        self.extensions()
    }
}

impl RequestExt for Parts {
    fn extensions_ref(&self) -> &axum::http::Extensions {
        &self.extensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn empty_request_has_nothing() {
        let request = Request::new(());
        assert_eq!(request.request_id(), None);
        assert_eq!(request.parsed_body(), None);
        assert_eq!(request.cookie("token"), None);
    }

    #[test]
    fn reads_pipeline_extensions() {
        let mut request = Request::new(());
        request
            .extensions_mut()
            .insert(RequestId::new(HeaderValue::from_static("req-1")));
        request
            .extensions_mut()
            .insert(ParsedBody(json!({"email": "ana@gym.example"})));
        request.extensions_mut().insert(Cookies::from(HashMap::from([(
            "token".to_string(),
            "abc".to_string(),
        )])));

        assert_eq!(request.request_id(), Some("req-1"));
        assert_eq!(request.parsed_body().unwrap()["email"], "ana@gym.example");

        let (parts, _) = request.into_parts();
        assert_eq!(parts.cookie("token"), Some("abc"));
    }
}
