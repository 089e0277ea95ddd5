//! API request and response types

use serde::Deserialize;
use serde::Serialize;

use crate::knowledge::IndexGeneration;
use crate::models::ConversationTurn;

/// Plain message body, used for greetings and confirmations
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body returned by every handler on failure, including rejected
/// request bodies and query strings
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Served pricing index; absent until the first build or attach
    pub index: Option<IndexGeneration>,
}

/// Chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_agent_id")]
    pub agent_id: i64,
    /// Conversation so far; loaded from stored history when omitted
    #[serde(default)]
    pub history: Option<Vec<ConversationTurn>>,
}

const fn default_agent_id() -> i64 {
    1
}

/// Chat history query parameters
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}
