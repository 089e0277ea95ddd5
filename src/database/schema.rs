use super::Database;
use crate::BikeHeroError;
use crate::Result;

/// Tables the service cannot run without
pub const REQUIRED_TABLES: [&str; 3] = ["agents", "chat_histories", "pricing_documents"];

impl Database {
    /// Check if database schema is initialized
    /// Returns true if all required tables exist
    pub async fn is_schema_initialized(&self) -> Result<bool> {
        for table_name in REQUIRED_TABLES {
            let exists = sqlx::query_scalar::<_, bool>(
                r"
                SELECT EXISTS (
                    SELECT FROM information_schema.tables
                    WHERE table_schema = 'public'
                    AND table_name = $1
                )
                ",
            )
            .bind(table_name)
            .fetch_one(&self.pool)
            .await?;

            if !exists {
                tracing::debug!("Missing required table: {}", table_name);
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Verify database schema or return helpful error
    pub async fn verify_schema_or_error(&self) -> Result<()> {
        if !self.is_schema_initialized().await? {
            return Err(BikeHeroError::Custom(
                "Database schema not initialized!\n\n\
                 Please run the following command to initialize the database:\n\n\
                 \x1b[1;32mbikehero init\x1b[0m"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Initialize database schema
    ///
    /// `dimension` fixes the width of the `pricing_documents.embedding` column.
    pub async fn init_schema(&self, dimension: usize) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS agents (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(255) UNIQUE NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS chat_histories (
                id BIGSERIAL PRIMARY KEY,
                agent_id BIGINT NOT NULL REFERENCES agents(id),
                message TEXT NOT NULL,
                response TEXT NOT NULL,
                metadata_info JSONB,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_histories_agent_created
             ON chat_histories(agent_id, created_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        // Dimension cannot be a bind parameter in DDL
        sqlx::query(&format!(
            r"
            CREATE TABLE IF NOT EXISTS pricing_documents (
                namespace VARCHAR(255) NOT NULL,
                section VARCHAR(32) NOT NULL,
                chunk_index INTEGER NOT NULL,
                position INTEGER NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                embedding VECTOR({dimension}) NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                PRIMARY KEY (namespace, section, chunk_index)
            )
            "
        ))
        .execute(&self.pool)
        .await?;

        tracing::info!("Database schema initialized (embedding dimension {})", dimension);
        Ok(())
    }

    /// Drop every table created by [`Database::init_schema`]
    pub async fn drop_schema(&self) -> Result<()> {
        sqlx::query("DROP TABLE IF EXISTS chat_histories, agents, pricing_documents")
            .execute(&self.pool)
            .await?;
        tracing::warn!("Dropped all BikeHero tables");
        Ok(())
    }
}
