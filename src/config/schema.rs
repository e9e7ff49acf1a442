//! Configuration schema definitions.
//!
//! Every process in this crate is configured from command-line flags only.
//! The binaries parse their flags with clap and map them onto these structs,
//! which are immutable once the process has started.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Externally advertised scheme of the reverse proxy.
///
/// The upstream is always spoken to over plain HTTP regardless of this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Proto {
    Http,
    Https,
}

impl Proto {
    pub fn as_str(&self) -> &'static str {
        match self {
            Proto::Http => "http",
            Proto::Https => "https",
        }
    }
}

impl fmt::Display for Proto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root configuration for the reverse proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, TLS material location).
    pub listener: ListenerConfig,

    /// Scheme exposed to clients.
    pub proto: Proto,

    /// Upstream `host:port`, always reached over plain HTTP.
    pub upstream: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            proto: Proto::Https,
            upstream: "localhost:9092".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:10000").
    pub bind_address: String,

    /// Where the throwaway certificate is written in https mode.
    pub tls: TlsConfig,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:10000".to_string(),
            tls: TlsConfig::default(),
        }
    }
}

/// Location of the generated certificate and key.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Directory receiving `localhost.crt` and `localhost.key`.
    pub cert_dir: PathBuf,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert_dir: std::env::temp_dir(),
        }
    }
}

impl TlsConfig {
    pub fn cert_path(&self) -> PathBuf {
        self.cert_dir.join("localhost.crt")
    }

    pub fn key_path(&self) -> PathBuf {
        self.cert_dir.join("localhost.key")
    }
}

/// Echo server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EchoConfig {
    pub bind_address: String,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9092".to_string(),
        }
    }
}

/// Request loop configuration.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Base URL of the echo server (or of a proxy in front of it).
    pub target: String,

    /// Delay between batches. Zero means a single batch.
    pub interval: Duration,

    /// Requests launched per batch.
    pub parallel: usize,

    /// A batch is skipped while this many requests are still in flight.
    pub max_in_flight: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            target: "http://localhost:9092".to_string(),
            interval: Duration::from_millis(10),
            parallel: 50,
            max_in_flight: 1000,
        }
    }
}
