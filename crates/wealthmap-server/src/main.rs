//! Wealthmap Server Binary
//!
//! Standalone server for the property directory API.

use std::sync::Arc;

use wealthmap_server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let db_path = std::env::var("WEALTHMAP_DB").unwrap_or_else(|_| "wealthmap.db".to_string());
    let state = Arc::new(AppState::open(&db_path)?);
    let addr = std::env::var("WEALTHMAP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    serve(&addr, state).await
}
