//! HTTP server setup and the proxy handler.
//!
//! # Responsibilities
//! - Create the Axum router: every path and method lands on one handler
//! - Wire up middleware (request ID, tracing)
//! - Run the pipeline: preflight → limits → rewrite → adapt → forward → adapt
//! - Translate pipeline failures into client responses
//! - Serve until the shutdown channel fires
//!
//! # Design Decisions
//! - Each request is handled independently; the only shared state is the
//!   read-only config and the pooled upstream client
//! - Limit checks run before any upstream work

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Method, Request},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::forward::Forwarder;
use crate::http::request::adapt_request;
use crate::http::response::adapt_response;
use crate::http::rewrite::rewrite_uri;
use crate::observability::{metrics, request_id::request_id, UuidRequestId};
use crate::resilience::Deadline;
use crate::security::cors::preflight_response;
use crate::security::limits::{check_declared_length, check_method};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub forwarder: Forwarder,
}

/// HTTP server for the reverse proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    pub fn new(config: ProxyConfig) -> Self {
        let forwarder = Forwarder::new(&config);
        let config = Arc::new(config);

        let state = AppState {
            config: config.clone(),
            forwarder,
        };

        Self {
            router: Self::build_router(state),
            config,
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |request: &Request<Body>| {
                            tracing::info_span!(
                                "request",
                                method = %request.method(),
                                uri = %request.uri(),
                                request_id = %request_id(request.headers()),
                            )
                        },
                    ))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The router with all middleware applied, for serving or `oneshot` tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Accept connections on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.target.origin(),
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();

    if method == Method::OPTIONS {
        tracing::debug!("Answering preflight locally");
        let response = preflight_response(&state.config);
        metrics::record_request(method.as_str(), response.status().as_u16(), "preflight", start);
        return response;
    }

    match proxy(&state, request).await {
        Ok(response) => {
            tracing::debug!(status = %response.status(), "Upstream responded");
            metrics::record_request(method.as_str(), response.status().as_u16(), "forwarded", start);
            response
        }
        Err(e) => {
            match &e {
                ProxyError::InternalFailure(_) => {
                    tracing::error!(error_kind = e.kind(), error = %e, "Request failed")
                }
                rejected if rejected.is_caller_error() => {
                    tracing::debug!(error_kind = rejected.kind(), error = %rejected, "Request rejected")
                }
                // Upstream failures are logged by the forwarder.
                _ => {}
            }
            let response = e.to_response(&state.config.security);
            metrics::record_request(method.as_str(), response.status().as_u16(), e.kind(), start);
            response
        }
    }
}

async fn proxy(state: &AppState, request: Request<Body>) -> Result<Response, ProxyError> {
    let config = &state.config;

    check_method(request.method(), &config.security)?;
    check_declared_length(request.headers(), config.security.max_body_bytes)?;

    let deadline = Deadline::after(config.security.timeout());
    let upstream_uri = rewrite_uri(request.uri(), &config.target)?;
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let outbound = adapt_request(request, peer, upstream_uri, config)?;
    let upstream = state.forwarder.forward(outbound, deadline).await?;

    Ok(adapt_response(upstream, config))
}
