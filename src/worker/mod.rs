//! Worker process: the unit the router balances across.
//!
//! # Endpoints
//! - `GET /process`: sleep a random time, report node id and the time taken
//! - `GET /health`: 200 while healthy, 503 once toggled off
//! - `POST /toggle-health`: flip the health flag (failure injection)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::config::WorkerConfig;

#[derive(Debug)]
pub struct WorkerState {
    node_id: String,
    healthy: AtomicBool,
    min_latency_ms: u64,
    max_latency_ms: u64,
}

impl WorkerState {
    pub fn new(config: &WorkerConfig) -> Self {
        Self {
            node_id: config.node_id.clone(),
            healthy: AtomicBool::new(true),
            min_latency_ms: config.min_latency_ms,
            max_latency_ms: config.max_latency_ms,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    /// Flip the health flag, returning the new value.
    pub fn toggle_health(&self) -> bool {
        !self.healthy.fetch_xor(true, Ordering::SeqCst)
    }

    fn planned_latency(&self) -> Duration {
        let ms = if self.max_latency_ms > self.min_latency_ms {
            fastrand::u64(self.min_latency_ms..self.max_latency_ms)
        } else {
            self.min_latency_ms
        };
        Duration::from_millis(ms)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub node_id: String,
    pub processing_time_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub fn app(state: Arc<WorkerState>) -> Router {
    Router::new()
        .route("/process", get(process))
        .route("/health", get(health))
        .route("/toggle-health", post(toggle_health).get(toggle_health))
        .with_state(state)
}

async fn process(State(state): State<Arc<WorkerState>>) -> Json<ProcessResponse> {
    let start = Instant::now();
    tokio::time::sleep(state.planned_latency()).await;
    let took_ms = start.elapsed().as_millis() as u64;
    tracing::debug!(node_id = %state.node_id, ms = took_ms, "Processed request");

    Json(ProcessResponse {
        node_id: state.node_id.clone(),
        processing_time_ms: took_ms,
    })
}

async fn health(State(state): State<Arc<WorkerState>>) -> impl IntoResponse {
    let status = if state.is_healthy() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };
    (
        status.0,
        Json(HealthResponse {
            status: status.1.to_string(),
        }),
    )
}

async fn toggle_health(State(state): State<Arc<WorkerState>>) -> &'static str {
    let healthy = state.toggle_health();
    tracing::info!(node_id = %state.node_id, healthy, "Health toggled");
    "health toggled"
}
