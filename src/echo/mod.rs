//! JSON echo server and the browser load-test page.
//!
//! ```text
//! GET /              → text/html request-loop page
//! GET /api/data?id=x → {"id": "x", "timestamp": <ms>, "data": "Response data for request x"}
//! ```
//!
//! Handlers are stateless; concurrency is whatever hyper gives per connection.

pub mod handlers;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

pub use handlers::EchoResponse;

/// Router serving the page and the data endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/", get(handlers::page))
        .route("/api/data", get(handlers::data))
        .layer(TraceLayer::new_for_http())
}

/// Serve the echo routes until the shutdown signal fires.
pub async fn serve(
    listener: TcpListener,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server is running at http://localhost:{}", addr.port());

    axum::serve(listener, router())
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!("Echo server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn get_data(uri: &str) -> EchoResponse {
        let response = router()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn echoes_id_verbatim() {
        let echo = get_data("/api/data?id=42").await;
        assert_eq!(echo.id, "42");
        assert_eq!(echo.data, "Response data for request 42");
    }

    #[tokio::test]
    async fn non_numeric_and_encoded_ids_pass_through() {
        assert_eq!(get_data("/api/data?id=abc%20def").await.id, "abc def");
        assert_eq!(get_data("/api/data?id=-1.5e9").await.id, "-1.5e9");
    }

    #[tokio::test]
    async fn missing_or_empty_id_is_empty_string() {
        let missing = get_data("/api/data").await;
        assert_eq!(missing.id, "");
        assert_eq!(missing.data, "Response data for request ");
        assert_eq!(get_data("/api/data?id=").await.id, "");
    }

    #[tokio::test]
    async fn first_id_wins() {
        assert_eq!(get_data("/api/data?other=1&id=a&id=b").await.id, "a");
    }

    #[tokio::test]
    async fn timestamps_do_not_go_backwards() {
        let mut last = 0;
        for i in 0..20 {
            let echo = get_data(&format!("/api/data?id={}", i)).await;
            assert!(echo.timestamp >= last);
            last = echo.timestamp;
        }
    }

    #[tokio::test]
    async fn serves_page() {
        let response = router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("/api/data?id="));
    }
}
