/// API request handlers
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::types::ErrorResponse;
use crate::api::types::HealthResponse;
use crate::api::types::MessageResponse;
use crate::config::SupportConfig;
use crate::database::Database;
use crate::knowledge::KnowledgeStore;
use crate::support::SupportAgent;

pub mod chat;
pub mod pricing;

pub use chat::*;
pub use pricing::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub database: Arc<Database>,
    pub knowledge: Arc<KnowledgeStore>,
    pub agent: Arc<SupportAgent>,
    pub support: Arc<SupportConfig>,
}

/// Status code plus error body
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
}

/// Greeting handler (GET /)
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Welcome to AI Agent Service API"))
}

/// Health check handler (GET /health)
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let index = state.knowledge.generation().await;
    Json(HealthResponse {
        status: if index.is_some() { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        index,
    })
}
