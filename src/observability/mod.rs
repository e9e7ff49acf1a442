//! Observability subsystem.
//!
//! Logging only: all processes emit structured `tracing` events and the HTTP
//! servers add per-request spans through `tower_http::trace::TraceLayer`.

pub mod logging;

pub use logging::init_logging;
