//! Configuration validation.
//!
//! Serde and clap handle syntax; these checks cover semantics. Each validator
//! returns every problem it finds rather than stopping at the first one.

use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::uri::Authority;
use thiserror::Error;
use url::Url;

use crate::config::schema::{EchoConfig, LoadConfig, ProxyConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address {0:?}")]
    BindAddress(String),

    #[error("invalid upstream {0:?}, expected host:port")]
    Upstream(String),

    #[error("invalid target URL {0:?}")]
    Target(String),

    #[error("parallel request count must be at least 1")]
    Parallel,

    #[error("max in-flight requests must be at least 1")]
    MaxInFlight,
}

pub fn validate_proxy_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if let Err(e) = upstream_authority(&config.upstream) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_echo_config(config: &EchoConfig) -> Result<(), Vec<ValidationError>> {
    match config.bind_address.parse::<SocketAddr>() {
        Ok(_) => Ok(()),
        Err(_) => Err(vec![ValidationError::BindAddress(config.bind_address.clone())]),
    }
}

pub fn validate_load_config(config: &LoadConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.target) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        _ => errors.push(ValidationError::Target(config.target.clone())),
    }
    if config.parallel == 0 {
        errors.push(ValidationError::Parallel);
    }
    if config.max_in_flight == 0 {
        errors.push(ValidationError::MaxInFlight);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Join validation errors into one human-readable line.
pub fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse an upstream `host:port` into a URI authority.
///
/// Userinfo and missing hosts are rejected; a missing port is allowed and
/// defaults to 80 on the client side.
pub fn upstream_authority(upstream: &str) -> Result<Authority, ValidationError> {
    let authority = Authority::from_str(upstream)
        .map_err(|_| ValidationError::Upstream(upstream.to_string()))?;
    if authority.host().is_empty() || authority.as_str().contains('@') {
        return Err(ValidationError::Upstream(upstream.to_string()));
    }
    Ok(authority)
}
