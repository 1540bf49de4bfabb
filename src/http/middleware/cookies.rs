//! Cookie parsing.

use std::collections::HashMap;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

/// Request cookies by name. Malformed pairs are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookies(HashMap<String, String>);

impl Cookies {
    pub fn from_jar(jar: &CookieJar) -> Self {
        Self(
            jar.iter()
                .map(|c| (c.name().to_string(), c.value().to_string()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, String>> for Cookies {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

pub async fn parse_cookies(mut request: Request<Body>, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let cookies = Cookies::from_jar(&jar);
    request.extensions_mut().insert(cookies);
    next.run(request).await
}
