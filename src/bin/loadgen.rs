//! Request-burst load generator against the echo endpoint.

use std::time::Duration;

use clap::Parser;

use resource_loop::config::LoadConfig;
use resource_loop::lifecycle::signals;
use resource_loop::loadgen::LoadGenerator;
use resource_loop::observability::init_logging;

#[derive(Parser)]
#[command(name = "loadgen")]
#[command(about = "Fire bursts of parallel requests at /api/data", long_about = None)]
struct Cli {
    /// Base URL of the echo server or of a proxy in front of it
    #[arg(long, default_value = "http://localhost:9092")]
    target: String,

    /// Request interval in milliseconds; 0 sends a single batch
    #[arg(long, default_value_t = 10)]
    interval_ms: u64,

    /// Parallel requests per batch
    #[arg(long, default_value_t = 50)]
    parallel: usize,

    /// Skip a batch while this many requests are still in flight
    #[arg(long, default_value_t = 1000)]
    max_in_flight: usize,

    /// Stop scheduling batches after this many seconds
    #[arg(long)]
    duration_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging("resource_loop=info");

    let cli = Cli::parse();
    let config = LoadConfig {
        target: cli.target,
        interval: Duration::from_millis(cli.interval_ms),
        parallel: cli.parallel,
        max_in_flight: cli.max_in_flight,
    };

    let generator = LoadGenerator::new(config)?;
    generator.start();

    if generator.is_running() {
        match cli.duration_secs {
            Some(secs) => {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {},
                    _ = signals::wait_for_signal() => {},
                }
            }
            None => signals::wait_for_signal().await,
        }
        generator.stop();
    }

    tokio::select! {
        _ = generator.wait_idle() => tracing::info!("All requests settled"),
        _ = signals::wait_for_signal() => {
            tracing::warn!(in_flight = generator.in_flight(), "Exiting with requests still in flight");
        }
    }
    Ok(())
}
