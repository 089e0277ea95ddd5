//! API route definitions

use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create the API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Chat endpoints
        .route("/chat/", post(handlers::chat))
        .route("/chat/history/", get(handlers::chat_history))
        // Catalog management
        .route("/agent/pricing/", post(handlers::update_pricing))
        .with_state(state)
}
