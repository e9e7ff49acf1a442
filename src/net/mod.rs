//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (https only)
//!     → tls.rs (mint key + self-signed certificate, load rustls config)
//! Startup (both schemes)
//!     → listener.rs (bind the listening socket)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Certificate material exists before any socket is bound
//! - TLS is optional and handled transparently by axum-server

pub mod listener;
pub mod tls;

pub use listener::{bind, ListenerError};
pub use tls::{bootstrap_self_signed, BootstrapError, CertPaths, SelfSignedSpec};
