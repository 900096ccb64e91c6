//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forward and admin handlers
//! - Wire up middleware (tracing, request ID)
//! - Serve on a listener until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::routing::get;
use axum::Router;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::admin;
use crate::config::RouterConfig;
use crate::http::proxy::forward_handler;
use crate::http::request::PROCESS_PATH;
use crate::load_balancer::BackendPool;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<BackendPool>,
    pub client: Client<HttpConnector, Body>,
    pub forward_timeout: Option<Duration>,
}

/// Client-facing HTTP server of the router.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(pool: Arc<BackendPool>, config: &RouterConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            pool,
            client,
            forward_timeout: config.forward_timeout(),
        };

        Self {
            router: Self::build_router(state),
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route(PROCESS_PATH, get(forward_handler))
            .merge(admin::admin_router())
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The assembled router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
