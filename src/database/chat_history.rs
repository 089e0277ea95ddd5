use super::Database;
use crate::models::ChatExchange;
use crate::models::ConversationTurn;
use crate::models::CreateChatExchangeRequest;
use crate::Result;

impl Database {
    /// Record one processed message and its outcome
    pub async fn create_chat_exchange(
        &self,
        request: &CreateChatExchangeRequest,
    ) -> Result<ChatExchange> {
        let metadata = serde_json::to_value(&request.outcome.metadata)?;

        let exchange = sqlx::query_as::<_, ChatExchange>(
            r"
            INSERT INTO chat_histories (agent_id, message, response, metadata_info)
            VALUES ($1, $2, $3, $4)
            RETURNING id, agent_id, message, response, metadata_info, created_at
            ",
        )
        .bind(request.agent_id)
        .bind(&request.message)
        .bind(&request.outcome.response)
        .bind(metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(exchange)
    }

    /// All exchanges, newest first
    pub async fn list_chat_history(&self, limit: Option<i64>) -> Result<Vec<ChatExchange>> {
        let exchanges = sqlx::query_as::<_, ChatExchange>(
            r"
            SELECT id, agent_id, message, response, metadata_info, created_at
            FROM chat_histories
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(exchanges)
    }

    /// The agent's most recent conversation turns, oldest first
    pub async fn recent_turns(&self, agent_id: i64, max_turns: usize) -> Result<Vec<ConversationTurn>> {
        if max_turns == 0 {
            return Ok(Vec::new());
        }

        let exchanges = sqlx::query_as::<_, ChatExchange>(
            r"
            SELECT id, agent_id, message, response, metadata_info, created_at
            FROM chat_histories
            WHERE agent_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(agent_id)
        .bind(max_turns.div_ceil(2) as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(turns_from_exchanges(&exchanges, max_turns))
    }
}

/// Flatten newest-first exchanges into the last `max_turns` turns, oldest first
pub(crate) fn turns_from_exchanges(
    exchanges: &[ChatExchange],
    max_turns: usize,
) -> Vec<ConversationTurn> {
    let turns: Vec<ConversationTurn> = exchanges
        .iter()
        .rev()
        .flat_map(ChatExchange::turns)
        .collect();
    let skip = turns.len().saturating_sub(max_turns);
    turns.into_iter().skip(skip).collect()
}
