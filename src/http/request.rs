//! Request handling for the forward path.
//!
//! # Responsibilities
//! - Carry the request ID assigned at the edge
//! - Build the single upstream request for a selected backend
//!
//! # Design Decisions
//! - Request ID is assigned by `SetRequestIdLayer` before any handler runs
//! - The upstream request is always `GET {backend}/process`, whatever the
//!   client asked for; client headers and body are not forwarded

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request};

use crate::load_balancer::Backend;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Path served by every worker.
pub const PROCESS_PATH: &str = "/process";

/// Request ID of an inbound request, or `"unknown"` if none was assigned.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Build `GET {backend.url}/process`, propagating the request ID.
pub fn upstream_request(backend: &Backend, request_id: &str) -> Result<Request<Body>, axum::http::Error> {
    let mut builder = Request::builder()
        .method(Method::GET)
        .uri(backend.endpoint(PROCESS_PATH))
        .header(header::ACCEPT, "*/*");

    if let Ok(value) = HeaderValue::from_str(request_id) {
        builder = builder.header(X_REQUEST_ID, value);
    }

    builder.body(Body::empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_request_targets_process() {
        let backend = Backend::new("b1", "http://w1:8080/");
        let req = upstream_request(&backend, "abc").unwrap();
        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.uri(), "http://w1:8080/process");
        assert_eq!(req.headers()[X_REQUEST_ID], "abc");
    }

    #[test]
    fn test_invalid_backend_url_fails_to_build() {
        let backend = Backend::new("b1", "not a url");
        assert!(upstream_request(&backend, "abc").is_err());
    }

    #[test]
    fn test_request_id_defaults_to_unknown() {
        assert_eq!(request_id(&HeaderMap::new()), "unknown");
    }
}
