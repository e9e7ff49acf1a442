//! Startup orchestration for the reverse proxy.
//!
//! # Responsibilities
//! - Validate configuration
//! - In https mode, mint the throwaway certificate and load it
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener is bound last, so a failed bootstrap never leaves a
//!   half-started proxy holding the port

use std::net::SocketAddr;

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::validation::{
    describe, upstream_authority, validate_proxy_config, ValidationError,
};
use crate::config::{Proto, ProxyConfig};
use crate::http::HttpServer;
use crate::net::{self, tls, BootstrapError, CertPaths, ListenerError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {}", describe(.0))]
    Config(Vec<ValidationError>),

    #[error("generating new certificate: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("loading TLS configuration: {0}")]
    Tls(#[source] std::io::Error),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// A proxy whose certificate (if any) exists and whose socket is bound.
pub struct PreparedProxy {
    server: HttpServer,
    listener: TcpListener,
    tls: Option<RustlsConfig>,
}

impl PreparedProxy {
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    /// Serve until the shutdown signal fires.
    pub async fn serve(self, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
        let served = match self.tls {
            Some(tls) => self.server.run_tls(self.listener, tls, shutdown).await,
            None => self.server.run(self.listener, shutdown).await,
        };
        served.map_err(StartupError::Serve)
    }
}

/// Run every startup step short of serving.
pub async fn prepare(config: &ProxyConfig) -> Result<PreparedProxy, StartupError> {
    validate_proxy_config(config).map_err(StartupError::Config)?;
    let upstream = upstream_authority(&config.upstream).map_err(|e| StartupError::Config(vec![e]))?;

    tracing::info!(
        proto = %config.proto,
        upstream = %upstream,
        bind_address = %config.listener.bind_address,
        "Configuration loaded"
    );

    let tls = match config.proto {
        Proto::Https => {
            let paths = CertPaths {
                key: config.listener.tls.key_path(),
                cert: config.listener.tls.cert_path(),
            };
            if let Err(e) = tls::bootstrap_self_signed(&paths) {
                tracing::error!(error = %e, "Certificate bootstrap failed");
                return Err(e.into());
            }
            let rustls = tls::load_tls_config(&paths.cert, &paths.key)
                .await
                .map_err(StartupError::Tls)?;
            Some(rustls)
        }
        Proto::Http => None,
    };

    let listener = net::bind(&config.listener.bind_address).await?;
    let port = listener.local_addr().map_err(ListenerError::Bind)?.port();
    tracing::info!("Starting proxy at {}://localhost:{}", config.proto, port);

    Ok(PreparedProxy {
        server: HttpServer::new(upstream, config.proto),
        listener,
        tls,
    })
}

/// Prepare and serve the proxy described by `config`.
pub async fn run(config: &ProxyConfig, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
    prepare(config).await?.serve(shutdown).await
}
