//! HTTP health probe.
//!
//! # Responsibilities
//! - Issue `GET {url}{path}` against one backend
//! - Map the outcome to a health status: exactly 200 is healthy, anything
//!   else (error, timeout, other status) is unhealthy

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::load_balancer::backend::join_url;
use crate::load_balancer::HealthStatus;
use crate::resilience::timeouts::with_deadline;

const USER_AGENT: &str = "relay-lb-health-check";

pub struct HttpProbe {
    client: Client<HttpConnector, Body>,
    path: String,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(path: impl Into<String>, timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            path: path.into(),
            timeout,
        }
    }

    /// Probe one backend. Never fails: every failure is an unhealthy result.
    pub async fn probe(&self, base_url: &str) -> HealthStatus {
        let uri = join_url(base_url, &self.path);

        let request = match Request::builder()
            .method(Method::GET)
            .uri(&uri)
            .header(header::USER_AGENT, USER_AGENT)
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::warn!(uri = %uri, error = %e, "Health check failed: invalid backend URL");
                return HealthStatus::Unhealthy;
            }
        };

        match with_deadline(Some(self.timeout), self.client.request(request)).await {
            Ok(Ok(response)) if response.status() == StatusCode::OK => HealthStatus::Healthy,
            Ok(Ok(response)) => {
                tracing::warn!(uri = %uri, status = %response.status(), "Health check failed: non-200 status");
                HealthStatus::Unhealthy
            }
            Ok(Err(e)) => {
                tracing::warn!(uri = %uri, error = %e, "Health check failed: connection error");
                HealthStatus::Unhealthy
            }
            Err(_) => {
                tracing::warn!(uri = %uri, timeout = ?self.timeout, "Health check failed: timeout");
                HealthStatus::Unhealthy
            }
        }
    }
}
