use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub live_backends: usize,
}

/// One live-set entry, in rotation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    pub id: String,
    pub url: String,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        live_backends: state.pool.len(),
    })
}

pub async fn get_backends(State(state): State<AppState>) -> Json<Vec<BackendStatus>> {
    Json(
        state
            .pool
            .snapshot()
            .into_iter()
            .map(|b| BackendStatus { id: b.id, url: b.url })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use crate::http::HttpServer;
    use crate::load_balancer::{Backend, BackendPool};
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_backends_listed_in_rotation_order() {
        let pool = Arc::new(BackendPool::with_backends(vec![
            Backend::new("b1", "http://w1"),
            Backend::new("b2", "http://w2"),
        ]));
        let router = HttpServer::new(pool, &RouterConfig::default()).router();

        let response = router
            .clone()
            .oneshot(Request::get("/admin/backends").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        let listed: Vec<BackendStatus> = serde_json::from_slice(&body).unwrap();
        assert_eq!(listed.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(), vec!["b1", "b2"]);

        let response = router
            .oneshot(Request::get("/admin/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        let status: SystemStatus = serde_json::from_slice(&body).unwrap();
        assert_eq!(status.live_backends, 2);
    }
}
