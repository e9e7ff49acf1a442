//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) unless the client sent one
//! - Strip hop-by-hop headers before forwarding
//! - Rewrite the target URI and `Host` to the upstream
//! - Record the client in `X-Forwarded-*` headers
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The body is passed through untouched and never buffered

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{request, Request, Uri, Version};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::config::Proto;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Request ID generator backed by random UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let value = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(value))
    }
}

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn remove_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// Build the request sent to the upstream from the one the client sent.
pub fn upstream_request(
    mut parts: request::Parts,
    body: Body,
    upstream: &Authority,
    proto: Proto,
    client: SocketAddr,
) -> Result<Request<Body>, axum::http::Error> {
    let original_host = parts
        .headers
        .get(header::HOST)
        .cloned()
        .or_else(|| {
            parts
                .uri
                .authority()
                .and_then(|a| HeaderValue::from_str(a.as_str()).ok())
        });

    let headers = &mut parts.headers;
    remove_hop_by_hop(headers);

    let prior: Vec<&str> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    let client_ip = client.ip().to_string();
    let forwarded_for = if prior.is_empty() {
        client_ip
    } else {
        format!("{}, {}", prior.join(", "), client_ip)
    };
    headers.insert(X_FORWARDED_FOR, HeaderValue::from_str(&forwarded_for)?);

    if let Some(host) = original_host {
        headers.insert(X_FORWARDED_HOST, host);
    }
    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static(proto.as_str()));
    headers.insert(header::HOST, HeaderValue::from_str(upstream.as_str())?);

    let path_and_query = parts
        .uri
        .path_and_query()
        .cloned()
        .unwrap_or_else(|| PathAndQuery::from_static("/"));
    let uri = Uri::builder()
        .scheme(Scheme::HTTP)
        .authority(upstream.clone())
        .path_and_query(path_and_query)
        .build()?;

    parts.uri = uri;
    // The upstream client speaks HTTP/1.1 only.
    parts.version = Version::HTTP_11;

    Ok(Request::from_parts(parts, body))
}
