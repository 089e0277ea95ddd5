//! Chat handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::api_error;
use super::ApiError;
use super::AppState;
use crate::api::types::ChatRequest;
use crate::api::types::HistoryQuery;
use crate::models::ChatExchange;
use crate::models::CreateChatExchangeRequest;
use crate::models::ResponseOutcome;
use crate::support::HISTORY_TURNS;

/// Answer a message (POST /chat/)
pub async fn chat(
    State(state): State<AppState>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ResponseOutcome>, ApiError> {
    let Json(request) = request.map_err(|rejection| {
        warn!("Rejected chat request: {}", rejection.body_text());
        api_error(rejection.status(), rejection.body_text())
    })?;
    info!("POST /chat/ agent_id={}", request.agent_id);

    let name = if request.agent_id == 1 {
        state.support.default_agent_name.clone()
    } else {
        format!("{} #{}", state.support.default_agent_name, request.agent_id)
    };
    state
        .database
        .ensure_agent(
            request.agent_id,
            &name,
            &state.support.default_agent_description,
        )
        .await
        .map_err(|e| {
            error!("Failed to ensure agent {}: {}", request.agent_id, e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    let history = match request.history {
        Some(history) => history,
        None => state
            .database
            .recent_turns(request.agent_id, HISTORY_TURNS)
            .await
            .map_err(|e| {
                error!("Failed to load chat history: {}", e);
                api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            })?,
    };

    let outcome = state.agent.process(&request.message, &history).await;

    state
        .database
        .create_chat_exchange(&CreateChatExchangeRequest {
            agent_id: request.agent_id,
            message: request.message,
            outcome: outcome.clone(),
        })
        .await
        .map_err(|e| {
            error!("Failed to save chat exchange: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(outcome))
}

/// List stored exchanges, newest first (GET /chat/history/)
pub async fn chat_history(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<ChatExchange>>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        warn!("Rejected history query: {}", rejection.body_text());
        api_error(rejection.status(), rejection.body_text())
    })?;
    info!("GET /chat/history/");

    let exchanges = state
        .database
        .list_chat_history(query.limit)
        .await
        .map_err(|e| {
            error!("Failed to list chat history: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(exchanges))
}
