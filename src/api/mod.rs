use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::summarizer::BatchSummarizer;

pub mod handlers;
pub mod models;

/// Summaries per request on the HTTP surface.
pub const HTTP_MAX_ITEMS: usize = 5;

pub struct AppState {
    /// Catalog file path (or raw JSON), reloaded on every request.
    pub catalog_source: String,
    pub summarizer: BatchSummarizer,
}

impl AppState {
    pub fn new(catalog_source: impl Into<String>, summarizer: BatchSummarizer) -> Self {
        Self {
            catalog_source: catalog_source.into(),
            summarizer,
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::health_handler))
        .route("/search", get(handlers::search_handler))
        .with_state(state)
        .layer(cors)
}
