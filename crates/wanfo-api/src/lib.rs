//! wanfo-api: REST control surface for the failover engine.
//!
//! Every route, including unknown paths, sits behind API-key
//! authentication. Handlers translate HTTP into calls on the shared
//! [`FailoverEngine`] and never hold state of their own.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/status` | Full status snapshot |
//! | GET | `/api/health` | Liveness check |
//! | POST | `/api/switch` | Manual switch, body `{"target": "<link name>"}` |
//! | POST | `/api/auto` | Toggle auto-failover, body `{"enabled": true}` |
//!
//! # Authentication
//!
//! `Authorization: Bearer <key>` or `?api_key=<key>`.

pub mod auth;
pub mod handlers;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use wanfo_core::FailoverEngine;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<FailoverEngine>,
    pub api_key: Arc<str>,
}

impl ApiState {
    pub fn new(engine: Arc<FailoverEngine>, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            engine,
            api_key: api_key.into(),
        }
    }
}

/// Build the complete API router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/api/status",
            get(handlers::status).fallback(handlers::not_found),
        )
        .route(
            "/api/health",
            get(handlers::health).fallback(handlers::not_found),
        )
        .route(
            "/api/switch",
            post(handlers::switch).fallback(handlers::not_found),
        )
        .route(
            "/api/auto",
            post(handlers::auto_mode).fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        .with_state(state)
}

/// Bind `addr` and serve until `shutdown` resolves.
///
/// In-flight requests are allowed to finish after the signal.
pub async fn serve<F>(state: ApiState, addr: SocketAddr, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("REST API listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
