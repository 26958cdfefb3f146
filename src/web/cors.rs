//! Cross-origin headers for a single allowed origin.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// The one origin granted cross-origin access.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origin: Arc<str>,
}

impl CorsPolicy {
    pub fn new(allowed_origin: &str) -> Self {
        Self {
            allowed_origin: Arc::from(allowed_origin),
        }
    }

    /// Exact, byte-for-byte origin match.
    pub fn allows(&self, origin: &HeaderValue) -> bool {
        origin.as_bytes() == self.allowed_origin.as_bytes()
    }
}

/// Attach CORS headers when the request's `Origin` is the allowed one.
///
/// Any other origin gets no CORS headers; the request is served either way.
pub async fn apply_cors(
    State(policy): State<CorsPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .filter(|origin| policy.allows(origin))
        .cloned();

    let mut response = next.run(request).await;

    if let Some(origin) = origin {
        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_must_match_exactly() {
        let policy = CorsPolicy::new("http://127.0.0.1:4000");

        assert!(policy.allows(&HeaderValue::from_static("http://127.0.0.1:4000")));
        assert!(!policy.allows(&HeaderValue::from_static("http://127.0.0.1:4000/")));
        assert!(!policy.allows(&HeaderValue::from_static("http://localhost:4000")));
        assert!(!policy.allows(&HeaderValue::from_static("HTTP://127.0.0.1:4000")));
    }
}
