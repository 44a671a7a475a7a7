//! Cross-origin policy for the form endpoints.
//!
//! # Design Decisions
//! - `Access-Control-Allow-Origin` is echoed only for an exact allow-list
//!   match; otherwise it is omitted and the browser blocks the read
//! - Method and credential headers are always present
//! - Never a wildcard origin, since credentials are allowed

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::config::CorsConfig;

/// Origins the front-end is served from.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    allowed_origins: HashSet<String>,
}

impl CorsPolicy {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_origins: origins.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &CorsConfig) -> Self {
        Self::new(config.allowed_origins.iter().cloned())
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.contains(origin)
    }

    /// Write the CORS headers for a request carrying `origin`.
    pub fn apply(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        if let Some(origin) = origin {
            if origin.to_str().map(|o| self.is_allowed(o)).unwrap_or(false) {
                headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            }
        }
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }
}

/// Middleware adding CORS headers to every form-endpoint response.
pub async fn cors_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request.headers().get(header::ORIGIN).cloned();
    let mut response = next.run(request).await;
    policy.apply(origin.as_ref(), response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> CorsPolicy {
        CorsPolicy::new(["https://www.acme.example"])
    }

    #[test]
    fn test_allowed_origin_is_echoed() {
        let mut headers = HeaderMap::new();
        let origin = HeaderValue::from_static("https://www.acme.example");
        policy().apply(Some(&origin), &mut headers);

        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://www.acme.example");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[test]
    fn test_unknown_origin_is_omitted() {
        let mut headers = HeaderMap::new();
        let origin = HeaderValue::from_static("https://evil.example");
        policy().apply(Some(&origin), &mut headers);

        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
    }

    #[test]
    fn test_match_is_exact() {
        let p = policy();
        assert!(!p.is_allowed("https://www.acme.example/"));
        assert!(!p.is_allowed("http://www.acme.example"));
        assert!(!p.is_allowed("https://www.acme.example.evil.example"));
    }
}
