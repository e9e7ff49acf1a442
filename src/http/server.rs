//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the single forwarding handler
//! - Wire up middleware (request ID, tracing)
//! - Serve over plain TCP or over TLS via axum-server
//! - Forward every request to the fixed upstream

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{uri::Authority, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::Proto;
use crate::http::request::{upstream_request, UuidRequestId, X_REQUEST_ID};
use crate::http::response::{bad_gateway, relay};

/// How long in-flight TLS connections may drain after shutdown.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Authority,
    pub proto: Proto,
}

/// HTTP server for the reverse proxy.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a proxy forwarding to `upstream`, exposed to clients as `proto`.
    pub fn new(upstream: Authority, proto: Proto) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            client,
            upstream,
            proto,
        };

        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// Serve plain HTTP until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.state.upstream,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on an already bound listener until the shutdown signal fires.
    pub async fn run_tls(
        self,
        listener: TcpListener,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.state.upstream,
            "HTTPS server starting"
        );

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            drain.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum_server::from_tcp_rustls(listener.into_std()?, tls)
            .handle(handle)
            .serve(app)
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Forward one request to the upstream and relay its answer.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        client = %client,
        "Proxying request"
    );

    let (parts, body) = request.into_parts();
    let forwarded = match upstream_request(parts, body, &state.upstream, state.proto, client) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Could not build upstream request");
            return (StatusCode::BAD_REQUEST, "Malformed request").into_response();
        }
    };

    match state.client.request(forwarded).await {
        Ok(response) => {
            tracing::debug!(
                request_id = %request_id,
                status = %response.status(),
                "Upstream responded"
            );
            relay(response)
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                upstream = %state.upstream,
                error = %e,
                "Upstream error"
            );
            bad_gateway()
        }
    }
}
