//! Echo server handlers.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::RawQuery,
    response::{Html, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};

static PAGE: &str = include_str!("page.html");

/// Body of `GET /api/data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoResponse {
    pub id: String,
    pub timestamp: i64,
    pub data: String,
}

impl EchoResponse {
    pub fn new(id: String, timestamp: i64) -> Self {
        let data = format!("Response data for request {}", id);
        Self { id, timestamp, data }
    }
}

/// `GET /`: the browser request-loop page.
pub async fn page() -> impl IntoResponse {
    Html(PAGE)
}

/// `GET /api/data?id=...`
///
/// The first `id` value is echoed as an opaque string; a missing one becomes
/// the empty string. Nothing is ever rejected.
pub async fn data(RawQuery(query): RawQuery) -> Json<EchoResponse> {
    let id = query
        .as_deref()
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "id")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_default();

    Json(EchoResponse::new(id, now_millis()))
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
