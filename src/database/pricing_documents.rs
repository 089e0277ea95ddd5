use pgvector::Vector;

use super::Database;
use crate::knowledge::IndexedDocument;
use crate::models::DocumentSection;
use crate::models::PricingDocument;
use crate::BikeHeroError;
use crate::Result;

#[derive(sqlx::FromRow)]
struct PricingDocumentRow {
    section: String,
    chunk_index: i32,
    title: String,
    content: String,
}

impl TryFrom<PricingDocumentRow> for PricingDocument {
    type Error = BikeHeroError;

    fn try_from(row: PricingDocumentRow) -> Result<Self> {
        let section = DocumentSection::parse(&row.section).ok_or_else(|| {
            BikeHeroError::Custom(format!("Unknown document section '{}'", row.section))
        })?;
        Ok(Self {
            section,
            index: row.chunk_index as usize,
            title: row.title,
            content: row.content,
        })
    }
}

impl Database {
    /// Replace a namespace's documents in one transaction
    pub async fn replace_pricing_documents(
        &self,
        namespace: &str,
        entries: &[IndexedDocument],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM pricing_documents WHERE namespace = $1")
            .bind(namespace)
            .execute(&mut *tx)
            .await?;

        for (position, entry) in entries.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO pricing_documents
                (namespace, section, chunk_index, position, title, content, embedding)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(namespace)
            .bind(entry.document.section.as_str())
            .bind(entry.document.index as i32)
            .bind(position as i32)
            .bind(&entry.document.title)
            .bind(&entry.document.content)
            .bind(Vector::from(entry.embedding.clone()))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(
            "Stored {} pricing documents for namespace '{}'",
            entries.len(),
            namespace
        );
        Ok(())
    }

    /// Nearest documents by cosine distance, build order breaking ties
    pub async fn nearest_pricing_documents(
        &self,
        namespace: &str,
        query_embedding: &[f32],
        limit: i64,
    ) -> Result<Vec<PricingDocument>> {
        let rows = sqlx::query_as::<_, PricingDocumentRow>(
            r"
            SELECT section, chunk_index, title, content
            FROM pricing_documents
            WHERE namespace = $1
            ORDER BY embedding <=> $2::vector, position
            LIMIT $3
            ",
        )
        .bind(namespace)
        .bind(Vector::from(query_embedding.to_vec()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PricingDocument::try_from).collect()
    }

    /// Number of documents stored for a namespace
    pub async fn count_pricing_documents(&self, namespace: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM pricing_documents WHERE namespace = $1",
        )
        .bind(namespace)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
