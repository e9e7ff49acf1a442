//! Structured logging.
//!
//! Every binary installs the same subscriber: an `EnvFilter` read from
//! `RUST_LOG` (falling back to a per-binary default) feeding a plain fmt layer.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// Calling this twice is harmless; the second call leaves the first
/// subscriber in place.
pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
