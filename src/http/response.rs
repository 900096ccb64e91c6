//! Response handling for the forward path.
//!
//! # Responsibilities
//! - Relay the backend's status, content type and body
//! - Map forward failures to gateway status codes
//!
//! # Design Decisions
//! - Bodies are read in full, up to `MAX_RELAY_BODY_BYTES`, so one deadline
//!   covers the whole forward: head and body
//! - One attempt per request: failures are reported, not retried
//! - Hung backends end in 504 once the forward timeout elapses, even when
//!   they stall after sending the response head

use axum::body::{Body, Bytes};
use axum::http::{header, response::Parts, StatusCode};
use axum::response::{IntoResponse, Response};
use hyper::body::Incoming;

/// Largest backend body the router will relay.
pub const MAX_RELAY_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Ways a forward can fail before a complete backend response is available.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("no healthy backends available")]
    NoBackends,

    #[error("failed to build upstream request: {0}")]
    BuildRequest(#[from] axum::http::Error),

    #[error("backend unavailable: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read backend body: {0}")]
    Body(axum::Error),

    #[error("backend timed out")]
    Timeout,
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::NoBackends => StatusCode::SERVICE_UNAVAILABLE,
            ForwardError::BuildRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ForwardError::Upstream(_) | ForwardError::Body(_) => StatusCode::BAD_GATEWAY,
            ForwardError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn client_message(&self) -> &'static str {
        match self {
            ForwardError::NoBackends => "no healthy backends available",
            ForwardError::BuildRequest(_) => "failed to create request",
            ForwardError::Upstream(_) | ForwardError::Body(_) => "backend unavailable",
            ForwardError::Timeout => "backend timed out",
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        (self.status(), self.client_message()).into_response()
    }
}

/// Read the backend body to the end.
pub async fn read_upstream(upstream: hyper::Response<Incoming>) -> Result<(Parts, Bytes), ForwardError> {
    let (parts, body) = upstream.into_parts();
    let bytes = axum::body::to_bytes(Body::new(body), MAX_RELAY_BODY_BYTES)
        .await
        .map_err(ForwardError::Body)?;
    Ok((parts, bytes))
}

/// Turn a fully read backend response into the client response.
pub fn relay(parts: Parts, body: Bytes) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = parts.status;
    if let Some(content_type) = parts.headers.get(header::CONTENT_TYPE) {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type.clone());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(ForwardError::NoBackends.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ForwardError::Timeout.status(), StatusCode::GATEWAY_TIMEOUT);

        let build = axum::http::Request::builder()
            .uri("not a uri")
            .body(())
            .unwrap_err();
        assert_eq!(
            ForwardError::from(build).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_relay_keeps_status_and_content_type_only() {
        let (parts, _) = axum::http::Response::builder()
            .status(StatusCode::ACCEPTED)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-backend-secret", "1")
            .body(())
            .unwrap()
            .into_parts();

        let response = relay(parts, Bytes::from_static(b"{}"));
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert!(!response.headers().contains_key("x-backend-secret"));
    }

    #[tokio::test]
    async fn test_no_backends_body() {
        let response = ForwardError::NoBackends.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"no healthy backends available");
    }
}
