//! Timer-driven request loop.
//!
//! # Responsibilities
//! - Launch one batch of `parallel` requests immediately on start
//! - Launch another batch every `interval` until stopped (never, if zero)
//! - Skip a whole batch while the in-flight ceiling is reached
//! - Time and log every request; report outcomes to an optional channel
//!
//! # Design Decisions
//! - One ticker task; every request runs in its own spawned task
//! - Stop aborts the ticker only, requests already sent run to completion
//! - No per-request timeout: a hung request stays counted

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use url::Url;

use crate::config::validation::{describe, validate_load_config, ValidationError};
use crate::config::LoadConfig;
use crate::loadgen::in_flight::InFlight;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid load configuration: {}", describe(.0))]
    Config(Vec<ValidationError>),

    #[error("building HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// How one request settled.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed {
        request_id: u64,
        elapsed: Duration,
        payload: serde_json::Value,
    },
    Failed {
        request_id: u64,
        error: String,
    },
}

impl Outcome {
    pub fn request_id(&self) -> u64 {
        match self {
            Outcome::Completed { request_id, .. } | Outcome::Failed { request_id, .. } => *request_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Completed { .. })
    }
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Batch {
    Launched(usize),
    Skipped { in_flight: usize },
}

struct Shared {
    config: LoadConfig,
    endpoint: Url,
    client: reqwest::Client,
    in_flight: InFlight,
    next_id: AtomicU64,
    outcomes: Option<mpsc::UnboundedSender<Outcome>>,
}

/// Load generator hitting `<target>/api/data?id=<n>`.
pub struct LoadGenerator {
    shared: Arc<Shared>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl LoadGenerator {
    pub fn new(config: LoadConfig) -> Result<Self, LoadError> {
        Self::build(config, None)
    }

    /// Like [`LoadGenerator::new`], also sending every outcome to `outcomes`.
    pub fn with_outcomes(
        config: LoadConfig,
        outcomes: mpsc::UnboundedSender<Outcome>,
    ) -> Result<Self, LoadError> {
        Self::build(config, Some(outcomes))
    }

    fn build(
        config: LoadConfig,
        outcomes: Option<mpsc::UnboundedSender<Outcome>>,
    ) -> Result<Self, LoadError> {
        validate_load_config(&config).map_err(LoadError::Config)?;
        let endpoint = Url::parse(&config.target)
            .and_then(|base| base.join("/api/data"))
            .map_err(|_| LoadError::Config(vec![ValidationError::Target(config.target.clone())]))?;
        let client = reqwest::Client::builder().build().map_err(LoadError::Client)?;

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                endpoint,
                client,
                in_flight: InFlight::new(),
                next_id: AtomicU64::new(0),
                outcomes,
            }),
            ticker: Mutex::new(None),
        })
    }

    /// Launch the first batch now and schedule the rest.
    ///
    /// A loop that is already running is stopped first.
    pub fn start(&self) -> Batch {
        self.stop();

        let config = &self.shared.config;
        tracing::info!(
            parallel = config.parallel,
            interval_ms = config.interval.as_millis() as u64,
            target = %self.shared.endpoint,
            "Starting {} parallel requests every {}ms",
            config.parallel,
            config.interval.as_millis()
        );

        let first = self.shared.launch_batch();

        if !config.interval.is_zero() {
            let shared = Arc::clone(&self.shared);
            let period = config.interval;
            let handle = tokio::spawn(async move {
                let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    shared.launch_batch();
                }
            });
            *self.lock_ticker() = Some(handle);
        }

        first
    }

    /// Cancel future batches. Requests already sent keep running.
    ///
    /// Returns how many requests were outstanding, or `None` if no loop was
    /// scheduled.
    pub fn stop(&self) -> Option<usize> {
        let handle = self.lock_ticker().take()?;
        handle.abort();

        let outstanding = self.shared.in_flight.get();
        tracing::info!(
            outstanding,
            "Request loop stopped. {} requests still in progress.",
            outstanding
        );
        Some(outstanding)
    }

    pub fn is_running(&self) -> bool {
        self.lock_ticker().is_some()
    }

    /// Launch a single batch outside the schedule.
    pub fn launch_batch(&self) -> Batch {
        self.shared.launch_batch()
    }

    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.get()
    }

    /// Resolve once every dispatched request has settled.
    pub async fn wait_idle(&self) {
        self.shared.in_flight.wait_idle().await
    }

    fn lock_ticker(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.ticker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for LoadGenerator {
    fn drop(&mut self) {
        if let Some(handle) = self.lock_ticker().take() {
            handle.abort();
        }
    }
}

impl Shared {
    fn launch_batch(self: &Arc<Self>) -> Batch {
        let in_flight = self.in_flight.get();
        if in_flight >= self.config.max_in_flight {
            tracing::warn!(
                in_flight,
                "Too many active requests ({}). Waiting for some to complete...",
                in_flight
            );
            return Batch::Skipped { in_flight };
        }

        for _ in 0..self.config.parallel {
            let request_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let guard = self.in_flight.enter();
            let shared = Arc::clone(self);

            tracing::debug!(request_id, "Request started");
            tokio::spawn(async move {
                let outcome = shared.fetch(request_id).await;
                if let Some(tx) = &shared.outcomes {
                    let _ = tx.send(outcome);
                }
                drop(guard);
            });
        }

        Batch::Launched(self.config.parallel)
    }

    async fn fetch(&self, request_id: u64) -> Outcome {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("id", &request_id.to_string());

        let started = Instant::now();
        let result = async {
            let response = self.client.get(url).send().await?.error_for_status()?;
            response.json::<serde_json::Value>().await
        }
        .await;
        let elapsed = started.elapsed();

        match result {
            Ok(payload) => {
                tracing::info!(
                    request_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    payload = %payload,
                    "Request completed"
                );
                Outcome::Completed {
                    request_id,
                    elapsed,
                    payload,
                }
            }
            Err(e) => {
                tracing::warn!(request_id, error = %e, "Request failed");
                Outcome::Failed {
                    request_id,
                    error: e.to_string(),
                }
            }
        }
    }
}
