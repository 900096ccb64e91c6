//! Forward handler: select, forward once, relay.

use std::time::Instant;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};

use crate::http::request::{request_id, upstream_request};
use crate::http::response::{read_upstream, relay, ForwardError};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;

pub async fn forward_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);

    // The pool lock is released before any network call.
    let Some(backend) = state.pool.next_backend() else {
        tracing::warn!(request_id = %request_id, "No healthy backends available");
        metrics::record_request(503, "none", start);
        return ForwardError::NoBackends.into_response();
    };

    tracing::debug!(request_id = %request_id, backend = %backend.id, "Forwarding request");

    let result = match upstream_request(&backend, &request_id) {
        // One deadline for the response head and the whole body.
        Ok(req) => {
            let forward = async {
                let upstream = state.client.request(req).await.map_err(ForwardError::Upstream)?;
                read_upstream(upstream).await
            };
            match with_deadline(state.forward_timeout, forward).await {
                Ok(result) => result,
                Err(_) => Err(ForwardError::Timeout),
            }
        }
        Err(e) => Err(ForwardError::BuildRequest(e)),
    };

    match result {
        Ok((parts, body)) => {
            metrics::record_request(parts.status.as_u16(), &backend.id, start);
            relay(parts, body)
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                backend = %backend.id,
                url = %backend.url,
                error = %e,
                "Forward failed"
            );
            metrics::record_request(e.status().as_u16(), &backend.id, start);
            e.into_response()
        }
    }
}
