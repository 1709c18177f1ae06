//! WealthMap Server - Property Directory API
//!
//! HTTP server exposing the property query engine and bookmark guard.

pub mod http;

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use wealthmap_core::Repository;

/// Shared application state
///
/// The repository is the single store handle, opened at process start and
/// injected into every handler.
pub struct AppState {
    pub repository: Mutex<Repository>,
}

impl AppState {
    /// Open the store at the given database path
    pub fn open(db_path: impl AsRef<Path>) -> wealthmap_core::Result<Self> {
        let repository = Repository::open(&db_path)?;
        tracing::info!("Opened property store at {:?}", db_path.as_ref());
        Ok(Self {
            repository: Mutex::new(repository),
        })
    }

    /// In-memory state (for testing)
    pub fn in_memory() -> wealthmap_core::Result<Self> {
        Ok(Self {
            repository: Mutex::new(Repository::in_memory()?),
        })
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Property endpoints
        .route("/properties", get(http::list_properties))
        .route("/properties", post(http::create_property))
        .route("/properties/{id}", get(http::get_property))
        .route("/properties/{id}", delete(http::delete_property))
        // Bookmark endpoints
        .route("/bookmarks", get(http::list_bookmarks))
        .route("/bookmarks", post(http::create_bookmark))
        .route("/bookmarks/{id}", delete(http::delete_bookmark))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Wealthmap server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
