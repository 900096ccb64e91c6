//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → proxy.rs (pick next backend from the live set)
//!     → request.rs (build GET {backend}/process)
//!     → response.rs (relay status + body, or map the failure)
//!     → Send to client
//! ```

pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ForwardError;
pub use server::{AppState, HttpServer};
