//! HTTP server setup and routing

use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::SqlitePool;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{handlers, sse};
use crate::catalog::CatalogClient;
use crate::error::{Error, Result};
use crate::playback::Coordinator;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub coordinator: Arc<Coordinator>,
    pub catalog: Arc<CatalogClient>,
    pub db_pool: SqlitePool,
}

/// Build the router with every control route
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::status))
        // Queue
        .route("/queue", get(handlers::get_queue).post(handlers::set_queue))
        // Playback
        .route("/play", post(handlers::play))
        .route("/play/:entry_id", post(handlers::play_entry))
        .route("/skip/next", post(handlers::skip_next))
        .route("/skip/previous", post(handlers::skip_previous))
        .route("/toggle", post(handlers::toggle))
        .route("/seek", post(handlers::seek))
        // Modes and detail view
        .route("/repeat", put(handlers::set_repeat))
        .route("/shuffle", put(handlers::set_shuffle))
        .route("/adv/open", post(handlers::open_adv))
        .route("/adv/close", post(handlers::close_adv))
        // Search and preferences
        .route("/search", get(handlers::search))
        .route(
            "/search/history",
            get(handlers::search_history).delete(handlers::clear_search_history),
        )
        .route("/splash", get(handlers::get_splash).put(handlers::set_splash))
        .route("/locale", get(handlers::locale))
        // SSE event stream
        .route("/events", get(sse::event_stream))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `addr` and serve until `shutdown` resolves
pub async fn serve<F>(addr: SocketAddr, ctx: AppContext, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Config(format!("Failed to bind to {}: {}", addr, e)))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
