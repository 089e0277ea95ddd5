//! Pricing knowledge: catalog segmentation, chunking, vector index and store

pub mod catalog;
pub mod chunker;
pub mod index;
pub mod store;

use async_trait::async_trait;
pub use catalog::catalog_fingerprint;
pub use catalog::default_catalog;
pub use catalog::load_catalog;
pub use catalog::validate_catalog;
pub use catalog::DocumentBuilder;
pub use chunker::TextChunk;
pub use chunker::TextChunker;
pub use index::IndexedDocument;
pub use index::MemoryVectorIndex;
pub use index::VectorIndex;
pub use store::IndexGeneration;
pub use store::KnowledgeStore;

use crate::errors::Result;

/// Source of context passages for answer generation
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>>;
}

#[async_trait]
impl ContextRetriever for KnowledgeStore {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>> {
        self.search(query, k).await
    }
}
