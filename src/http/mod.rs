//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → request.rs (hop-by-hop stripping, Host/URI rewrite, X-Forwarded-*)
//!     → upstream over plain HTTP/1.1
//!     → response.rs (hop-by-hop stripping, 502 on upstream failure)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
