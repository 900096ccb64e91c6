//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use relay_lb::config::LbConfig;
use relay_lb::lifecycle::{start_router, RouterHandle, Shutdown};
use relay_lb::registry::MemoryRegistry;

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` is called once per connection and returns `(status, content type, body)`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, &'static str, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        // Drain the request head before answering.
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;

                        let (status, content_type, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            418 => "418 I'm a teapot",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            content_type,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// A backend that writes `raw` verbatim and then holds the connection open
/// without sending anything else.
pub async fn start_stalling_backend(raw: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(raw.as_bytes()).await;
                tokio::time::sleep(Duration::from_secs(60)).await;
            });
        }
    });

    addr
}

/// A backend that always answers `/process` with its own name as JSON.
pub async fn start_named_backend(name: &'static str) -> SocketAddr {
    start_programmable_backend(move || async move {
        (200, "application/json", format!(r#"{{"node_id":"{}"}}"#, name))
    })
    .await
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Router config with a short forward timeout and resync disabled.
pub fn router_config() -> LbConfig {
    let mut config = LbConfig::default();
    config.router.forward_timeout_secs = 2;
    config.router.resync_interval_secs = 0;
    config.router.resubscribe_base_delay_ms = 10;
    config.router.resubscribe_max_delay_ms = 50;
    config
}

/// Start a router against `registry` on an ephemeral port.
pub async fn spawn_router(config: &LbConfig, registry: Arc<MemoryRegistry>, shutdown: &Shutdown) -> RouterHandle {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    start_router(config, registry, listener, shutdown).await.unwrap()
}

/// Poll `check` until it holds, failing the test after `timeout`.
pub async fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + timeout;
    while !check() {
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not reached within {:?}", timeout);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
