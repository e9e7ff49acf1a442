//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command-line flags (clap, per binary)
//!     → schema.rs (typed config structs with defaults)
//!     → validation.rs (semantic checks)
//!     → config handed to the subsystem, immutable from then on
//! ```
//!
//! # Design Decisions
//! - No config files and no reload; flags are the only source
//! - All fields have defaults so every flag is optional
//! - Validation separates syntactic (clap) from semantic checks

pub mod schema;
pub mod validation;

pub use schema::{EchoConfig, ListenerConfig, LoadConfig, Proto, ProxyConfig, TlsConfig};
pub use validation::ValidationError;
