//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the upstream response to the client without buffering
//! - Remove hop-by-hop headers
//! - Map upstream failures to gateway errors

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hyper::body::Incoming;

use crate::http::request::remove_hop_by_hop;

/// Turn an upstream response into the response for the client.
///
/// Status, remaining headers and body are passed through as-is.
pub fn relay(response: Response<Incoming>) -> Response {
    let (mut parts, body) = response.into_parts();
    remove_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}

/// Response sent when the upstream could not be reached.
pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
}
