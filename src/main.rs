//! Reverse proxy forwarding every request to one plain-HTTP upstream.
//!
//! In https mode a fresh self-signed `localhost` certificate is generated
//! before the listener is bound; failing to generate or write it aborts
//! startup.

use std::path::PathBuf;

use clap::Parser;

use resource_loop::config::{ListenerConfig, Proto, ProxyConfig, TlsConfig};
use resource_loop::lifecycle::{startup, Shutdown};
use resource_loop::observability::init_logging;

#[derive(Parser)]
#[command(name = "reverse-proxy")]
#[command(about = "Forward all traffic to a single upstream, optionally over throwaway TLS", long_about = None)]
struct Cli {
    /// http or https
    #[arg(long, value_enum, default_value_t = Proto::Https)]
    proto: Proto,

    /// upstream server
    #[arg(long, default_value = "localhost:9092")]
    upstream: String,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:10000")]
    listen: String,

    /// Directory for the generated certificate and key [default: OS temp dir]
    #[arg(long)]
    cert_dir: Option<PathBuf>,
}

impl From<Cli> for ProxyConfig {
    fn from(cli: Cli) -> Self {
        let tls = match cli.cert_dir {
            Some(cert_dir) => TlsConfig { cert_dir },
            None => TlsConfig::default(),
        };
        ProxyConfig {
            listener: ListenerConfig {
                bind_address: cli.listen,
                tls,
            },
            proto: cli.proto,
            upstream: cli.upstream,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging("resource_loop=debug,tower_http=debug");

    let config = ProxyConfig::from(Cli::parse());
    tracing::info!("reverse-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    startup::run(&config, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
