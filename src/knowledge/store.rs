//! Knowledge store: builds, replaces and searches the pricing index

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::catalog::catalog_fingerprint;
use super::catalog::default_catalog;
use super::catalog::validate_catalog;
use super::catalog::DocumentBuilder;
use super::chunker::TextChunker;
use super::index::IndexedDocument;
use super::index::VectorIndex;
use crate::config::AppConfig;
use crate::embeddings::Embedder;
use crate::errors::BikeHeroError;
use crate::errors::Result;
use crate::models::PricingCatalog;

/// Summary of the index currently being served
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexGeneration {
    pub namespace: String,
    pub documents: usize,
    /// Catalog fingerprint; `None` when the index was adopted from storage
    pub fingerprint: Option<String>,
    pub built_at: DateTime<Utc>,
}

/// Pricing knowledge behind an embedder and a vector index
pub struct KnowledgeStore {
    namespace: String,
    builder: DocumentBuilder,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    generation: RwLock<Option<IndexGeneration>>,
}

impl KnowledgeStore {
    pub fn new(
        namespace: impl Into<String>,
        builder: DocumentBuilder,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            builder,
            embedder,
            index,
            generation: RwLock::new(None),
        }
    }

    /// Store configured from the `knowledge` and `support` sections
    pub fn from_config(
        config: &AppConfig,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
    ) -> Result<Self> {
        let chunker =
            TextChunker::new(config.knowledge.chunk_size, config.knowledge.chunk_overlap)?;
        Ok(Self::new(
            config.knowledge.namespace.clone(),
            DocumentBuilder::new(chunker, config.booking_url()),
            embedder,
            index,
        ))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Rebuild the whole index from `catalog`, or the built-in catalog
    ///
    /// Searches wait until the rebuild finishes. On failure the previous
    /// generation stays in service.
    pub async fn initialize(&self, catalog: Option<&PricingCatalog>) -> Result<IndexGeneration> {
        let default;
        let catalog = match catalog {
            Some(catalog) => catalog,
            None => {
                default = default_catalog();
                &default
            }
        };
        validate_catalog(catalog)?;

        let mut generation = self.generation.write().await;

        let documents = self.builder.build(catalog);
        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        debug!(
            "Embedding {} pricing documents for namespace '{}'",
            texts.len(),
            self.namespace
        );

        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != documents.len() {
            return Err(BikeHeroError::EmbeddingError(format!(
                "Expected {} embeddings, got {}",
                documents.len(),
                embeddings.len()
            )));
        }

        let entries: Vec<IndexedDocument> = documents
            .into_iter()
            .zip(embeddings)
            .map(|(document, embedding)| IndexedDocument {
                document,
                embedding,
            })
            .collect();
        let count = entries.len();
        self.index.replace(&self.namespace, entries).await?;

        let built = IndexGeneration {
            namespace: self.namespace.clone(),
            documents: count,
            fingerprint: Some(catalog_fingerprint(catalog)?),
            built_at: Utc::now(),
        };
        *generation = Some(built.clone());

        info!(
            "Indexed {} pricing documents into namespace '{}'",
            count, self.namespace
        );
        Ok(built)
    }

    /// Replace the served catalog
    pub async fn update(&self, catalog: &PricingCatalog) -> Result<IndexGeneration> {
        self.initialize(Some(catalog)).await
    }

    /// Serve an index that is already persisted for this namespace
    pub async fn attach(&self) -> Result<Option<IndexGeneration>> {
        let mut generation = self.generation.write().await;

        let documents = self.index.count(&self.namespace).await?;
        if documents == 0 {
            warn!("No persisted index for namespace '{}'", self.namespace);
            return Ok(None);
        }

        let adopted = IndexGeneration {
            namespace: self.namespace.clone(),
            documents,
            fingerprint: None,
            built_at: Utc::now(),
        };
        *generation = Some(adopted.clone());
        info!(
            "Attached persisted index with {} documents for namespace '{}'",
            documents, self.namespace
        );
        Ok(Some(adopted))
    }

    /// Text of the `k` documents most similar to `query`, most relevant first
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let generation = self.generation.read().await;
        if generation.is_none() {
            return Err(BikeHeroError::NotInitialized(self.namespace.clone()));
        }

        let embedding = self.embedder.embed(query).await?;
        let documents = self.index.nearest(&self.namespace, &embedding, k).await?;
        debug!("Retrieved {} pricing documents", documents.len());

        Ok(documents.into_iter().map(|d| d.content).collect())
    }

    /// Currently served generation, if any
    pub async fn generation(&self) -> Option<IndexGeneration> {
        self.generation.read().await.clone()
    }
}
