//! TCP listener binding.
//!
//! # Responsibilities
//! - Resolve and bind the configured address
//! - Hand the socket to the plain or TLS serving path

use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Address could not be parsed.
    Address(String),
    /// Failed to bind to address.
    Bind(std::io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Address(a) => write!(f, "Invalid listen address: {}", a),
            ListenerError::Bind(e) => write!(f, "Failed to bind: {}", e),
        }
    }
}

impl std::error::Error for ListenerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ListenerError::Address(_) => None,
            ListenerError::Bind(e) => Some(e),
        }
    }
}

/// Bind a TCP listener on `bind_address`.
pub async fn bind(bind_address: &str) -> Result<TcpListener, ListenerError> {
    let addr: SocketAddr = bind_address
        .parse()
        .map_err(|_| ListenerError::Address(bind_address.to_string()))?;

    let listener = TcpListener::bind(addr).await.map_err(ListenerError::Bind)?;
    let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;

    tracing::info!(address = %local_addr, "Listener bound");
    Ok(listener)
}
