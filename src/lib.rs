//! Resource loop: a request-burst load-test harness and a single-upstream
//! reverse proxy with optional throwaway TLS.
//!
//! # Architecture Overview
//!
//! ```text
//!   loadgen / browser page ──▶ reverse proxy (:10000) ──▶ echo server (:9092)
//!                                    │
//!                                    └─ https: self-signed cert minted at startup
//! ```

pub mod config;
pub mod echo;
pub mod http;
pub mod lifecycle;
pub mod loadgen;
pub mod net;
pub mod observability;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
