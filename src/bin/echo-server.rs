//! JSON echo server and browser load-test page.

use clap::Parser;

use resource_loop::config::validation::validate_echo_config;
use resource_loop::config::EchoConfig;
use resource_loop::echo;
use resource_loop::lifecycle::Shutdown;
use resource_loop::net;
use resource_loop::observability::init_logging;

#[derive(Parser)]
#[command(name = "echo-server")]
#[command(about = "Serve the request-loop page and the /api/data echo endpoint", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:9092")]
    listen: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging("resource_loop=info,tower_http=info");

    let cli = Cli::parse();
    let config = EchoConfig {
        bind_address: cli.listen,
    };
    if let Err(errors) = validate_echo_config(&config) {
        for e in &errors {
            tracing::error!(error = %e, "Invalid configuration");
        }
        return Err(format!("{} configuration error(s)", errors.len()).into());
    }

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let listener = net::bind(&config.bind_address).await?;
    echo::serve(listener, shutdown.subscribe()).await?;
    Ok(())
}
