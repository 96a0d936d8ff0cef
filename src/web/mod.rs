//! Web front end: one page, one input, one transcript per browser session.

pub mod page;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::chat::{MAX_QUESTION_BYTES, SessionStore};

pub use page::PageConfig;
pub use routes::SESSION_COOKIE;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub page: Arc<PageConfig>,
}

impl AppState {
    pub fn new(store: SessionStore, page: PageConfig) -> Self {
        Self {
            store: Arc::new(store),
            page: Arc::new(page),
        }
    }
}

/// Request body cap. Room for a maximal question after form encoding, which
/// can triple the size of non-ASCII text.
const MAX_BODY_BYTES: usize = MAX_QUESTION_BYTES * 4;

/// Upper bound on how often idle sessions are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index).post(routes::submit_form))
        .route(
            "/api/messages",
            get(routes::list_messages).post(routes::post_message),
        )
        .route("/health", get(routes::health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the chat page until Ctrl+C.
pub async fn serve(bind: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind to {bind}"))?;

    let address = listener.local_addr().context("Failed to read bound address")?;
    info!(%address, "chat server listening");

    let sweeper = tokio::spawn(sweep_idle_sessions(Arc::clone(&state.store)));

    let served = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Chat server terminated unexpectedly");
    sweeper.abort();
    served?;

    info!("chat server stopped");
    Ok(())
}

/// Drops idle sessions for as long as the server runs.
async fn sweep_idle_sessions(store: Arc<SessionStore>) {
    let period = store
        .limits()
        .idle_timeout
        .clamp(Duration::from_secs(1), SWEEP_INTERVAL);
    let mut ticks = tokio::time::interval(period);
    loop {
        ticks.tick().await;
        store.evict_idle().await;
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C; shutdown only by termination");
        std::future::pending::<()>().await;
    }
}
