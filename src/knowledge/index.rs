//! Vector index backends
//!
//! Every backend replaces a namespace wholesale; there is no per-document
//! upsert. Results are ordered by cosine similarity, ties by the position the
//! document had when the generation was built.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::Database;
use crate::errors::Result;
use crate::models::PricingDocument;

/// A document together with its embedding
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    pub document: PricingDocument,
    pub embedding: Vec<f32>,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Atomically replace everything stored under `namespace`
    async fn replace(&self, namespace: &str, entries: Vec<IndexedDocument>) -> Result<()>;

    /// The `k` documents nearest to `query`, most similar first
    async fn nearest(&self, namespace: &str, query: &[f32], k: usize)
        -> Result<Vec<PricingDocument>>;

    /// Number of documents stored under `namespace`
    async fn count(&self, namespace: &str) -> Result<usize>;
}

/// Process-local index
#[derive(Debug, Default)]
pub struct MemoryVectorIndex {
    namespaces: RwLock<HashMap<String, Vec<IndexedDocument>>>,
}

impl MemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn replace(&self, namespace: &str, entries: Vec<IndexedDocument>) -> Result<()> {
        self.namespaces
            .write()
            .await
            .insert(namespace.to_string(), entries);
        Ok(())
    }

    async fn nearest(
        &self,
        namespace: &str,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<PricingDocument>> {
        let namespaces = self.namespaces.read().await;
        let Some(entries) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(f32, &IndexedDocument)> = entries
            .iter()
            .map(|entry| (cosine_similarity(query, &entry.embedding), entry))
            .collect();
        // Stable sort keeps build order among equal scores
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, entry)| entry.document.clone())
            .collect())
    }

    async fn count(&self, namespace: &str) -> Result<usize> {
        Ok(self
            .namespaces
            .read()
            .await
            .get(namespace)
            .map_or(0, Vec::len))
    }
}

#[async_trait]
impl VectorIndex for Database {
    async fn replace(&self, namespace: &str, entries: Vec<IndexedDocument>) -> Result<()> {
        self.replace_pricing_documents(namespace, &entries).await
    }

    async fn nearest(
        &self,
        namespace: &str,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<PricingDocument>> {
        self.nearest_pricing_documents(namespace, query, k as i64)
            .await
    }

    async fn count(&self, namespace: &str) -> Result<usize> {
        Ok(self.count_pricing_documents(namespace).await? as usize)
    }
}

/// Cosine similarity; zero when either vector has no magnitude or lengths differ
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentSection;

    fn entry(index: usize, content: &str, embedding: Vec<f32>) -> IndexedDocument {
        IndexedDocument {
            document: PricingDocument {
                section: DocumentSection::Packages,
                index,
                title: format!("doc {index}"),
                content: content.to_string(),
            },
            embedding,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_nearest_orders_by_similarity() {
        let index = MemoryVectorIndex::new();
        index
            .replace(
                "pricing",
                vec![
                    entry(0, "brakes", vec![1.0, 0.0, 0.0]),
                    entry(1, "gears", vec![0.0, 1.0, 0.0]),
                    entry(2, "wash", vec![0.7, 0.7, 0.0]),
                ],
            )
            .await
            .unwrap();

        let results = index.nearest("pricing", &[0.0, 1.0, 0.0], 2).await.unwrap();
        let contents: Vec<&str> = results.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, vec!["gears", "wash"]);
    }

    #[tokio::test]
    async fn test_ties_keep_build_order() {
        let index = MemoryVectorIndex::new();
        index
            .replace(
                "pricing",
                vec![
                    entry(0, "first", vec![1.0, 0.0]),
                    entry(1, "second", vec![1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        let results = index.nearest("pricing", &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results[0].content, "first");
        assert_eq!(results[1].content, "second");
    }

    #[tokio::test]
    async fn test_replace_supersedes_namespace_only() {
        let index = MemoryVectorIndex::new();
        index
            .replace("a", vec![entry(0, "old", vec![1.0]), entry(1, "old", vec![1.0])])
            .await
            .unwrap();
        index.replace("b", vec![entry(0, "other", vec![1.0])]).await.unwrap();
        index.replace("a", vec![entry(0, "new", vec![1.0])]).await.unwrap();

        assert_eq!(index.count("a").await.unwrap(), 1);
        assert_eq!(index.count("b").await.unwrap(), 1);
        assert_eq!(index.nearest("a", &[1.0], 5).await.unwrap()[0].content, "new");
        assert!(index.nearest("missing", &[1.0], 5).await.unwrap().is_empty());
    }
}
