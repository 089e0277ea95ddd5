//! Pricing catalog handlers

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::api_error;
use super::ApiError;
use super::AppState;
use crate::api::types::MessageResponse;
use crate::errors::BikeHeroError;
use crate::models::PricingCatalog;

/// Replace the pricing catalog and rebuild the index (POST /agent/pricing/)
pub async fn update_pricing(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("POST /agent/pricing/ ({} bytes)", body.len());

    let catalog: PricingCatalog = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected pricing catalog: {}", e);
        api_error(StatusCode::BAD_REQUEST, format!("Invalid pricing catalog: {e}"))
    })?;

    match state.knowledge.update(&catalog).await {
        Ok(generation) => {
            info!(
                "Pricing context updated: {} documents",
                generation.documents
            );
            Ok(Json(MessageResponse::new(
                "Pricing context updated successfully",
            )))
        }
        Err(e @ BikeHeroError::InvalidCatalog(_)) => {
            warn!("Rejected pricing catalog: {}", e);
            Err(api_error(StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e) => {
            error!("Failed to update pricing context: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
