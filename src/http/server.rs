//! HTTP router and server loop.

use crate::http::mcp;
use crate::http::status::{self, StatusPresenter};
use crate::tools::{ComponentRegistry, Dispatcher};
use crate::types::{Config, Result};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub config: Arc<Config>,
    pub presenter: Arc<StatusPresenter>,
}

impl AppState {
    pub fn new(registry: Arc<ComponentRegistry>, config: Arc<Config>) -> Result<Self> {
        Ok(Self {
            dispatcher: Dispatcher::new(registry),
            config,
            presenter: Arc::new(StatusPresenter::new()?),
        })
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Every route the server exposes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status::status_page))
        .route("/tools", get(status::list_tools))
        .route("/test-tool-connection", post(status::test_tool_connection))
        .route("/health", get(health))
        .merge(mcp::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP server with cooperative shutdown.
#[derive(Debug)]
pub struct HttpServer {
    state: AppState,
    addr: SocketAddr,
    cancel: CancellationToken,
}

impl HttpServer {
    pub fn new(state: AppState, addr: SocketAddr) -> Self {
        Self {
            state,
            addr,
            cancel: CancellationToken::new(),
        }
    }

    /// Run until [`shutdown`](Self::shutdown) is called or the listener fails.
    pub async fn serve(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!(
            addr = %self.addr,
            application = %self.state.config.server.application_name,
            "HTTP server listening"
        );

        let cancel = self.cancel.clone();
        axum::serve(listener, router(self.state.clone()))
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }

    /// Signal the server to stop accepting connections.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
