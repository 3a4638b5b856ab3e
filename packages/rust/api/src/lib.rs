//! Thin HTTP surface over the Scout pipeline and its helpers.
//!
//! Every domain failure is answered with status 200 and either an `Error: ...`
//! string in the payload or an `{"error": ...}` object.

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use scout_core::Scout;
use scout_shared::{Result, ScoutError};

pub use routes::create_router;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub scout: Arc<Scout>,
    /// Held while a handler writes one of the fixed output files.
    pub artifacts: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(scout: Scout) -> Self {
        Self {
            scout: Arc::new(scout),
            artifacts: Arc::new(Mutex::new(())),
        }
    }
}

/// The router with tracing and permissive CORS applied.
pub fn app(state: AppState) -> Router {
    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(scout: Scout, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ScoutError::Network(format!("failed to bind {addr}: {e}")))?;

    info!(%addr, "Scout API listening");

    axum::serve(listener, app(AppState::new(scout)))
        .await
        .map_err(|e| ScoutError::Network(format!("server error: {e}")))
}
