use super::Database;
use crate::models::Agent;
use crate::BikeHeroError;
use crate::Result;

impl Database {
    /// Get an agent by id
    pub async fn get_agent(&self, id: i64) -> Result<Option<Agent>> {
        let agent = sqlx::query_as::<_, Agent>(
            "SELECT id, name, description, created_at, updated_at FROM agents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(agent)
    }

    /// Return the agent with `id`, creating it when missing
    pub async fn ensure_agent(&self, id: i64, name: &str, description: &str) -> Result<Agent> {
        if let Some(agent) = self.get_agent(id).await? {
            return Ok(agent);
        }

        sqlx::query(
            r"
            INSERT INTO agents (id, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .execute(&self.pool)
        .await?;

        // Explicit ids bypass the sequence
        sqlx::query(
            "SELECT setval(pg_get_serial_sequence('agents', 'id'), GREATEST((SELECT MAX(id) FROM agents), 1))",
        )
        .execute(&self.pool)
        .await?;

        let agent = self.get_agent(id).await?.ok_or_else(|| {
            BikeHeroError::Custom(format!(
                "Could not create agent {id}: name '{name}' is already taken"
            ))
        })?;
        tracing::info!("Created agent {} ({})", agent.id, agent.name);
        Ok(agent)
    }
}
