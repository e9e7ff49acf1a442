//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → [https] bootstrap certificate → bind listener → serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop accepting → drain connections → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{PreparedProxy, StartupError};
