//! Native request loop.
//!
//! # Data Flow
//! ```text
//! start()
//!     → runner.rs (first batch now, ticker task for the rest)
//!     → one spawned task per request, each holding an in_flight.rs guard
//!     → outcome logged (and optionally sent over a channel)
//!     → guard dropped, counter decremented
//! ```

pub mod in_flight;
pub mod runner;

pub use in_flight::{InFlight, InFlightGuard};
pub use runner::{Batch, LoadError, LoadGenerator, Outcome};
