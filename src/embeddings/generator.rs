//! Embedding generation service with batching and retries

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::client::EmbeddingClient;
use super::Embedder;
use super::EmbeddingConfig;
use super::MAX_BATCH_SIZE;
use crate::config::ModelProvider;
use crate::errors::BikeHeroError;
use crate::errors::Result;
use crate::retry::RetryPolicy;

/// Embedding service used by the knowledge store
pub struct EmbeddingService {
    client: Arc<EmbeddingClient>,
    config: EmbeddingConfig,
    retry: RetryPolicy,
}

impl EmbeddingService {
    /// Create a new embedding service
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        Self::from_config(
            EmbeddingConfig::from_app_config(config),
            config.request_timeout(),
            RetryPolicy::from_config(&config.http),
        )
    }

    /// Create from custom config
    pub fn from_config(
        config: EmbeddingConfig,
        timeout: std::time::Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let client = EmbeddingClient::new(
            config.provider,
            config.model.clone(),
            config.endpoint.clone(),
            config.api_key.clone(),
            timeout,
        )?;

        Ok(Self {
            client: Arc::new(client),
            config,
            retry,
        })
    }

    /// Generate embedding for a single text
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        let processed = normalize_whitespace(text);
        if processed.is_empty() {
            return Ok(vec![0.0; self.config.dimension]);
        }

        let embedding = self
            .retry
            .run("embedding", || self.client.generate(&processed))
            .await?;
        self.check_dimension(&embedding)?;
        Ok(embedding)
    }

    /// Generate embeddings for multiple texts in batch
    ///
    /// Blank texts get a zero vector at their position.
    pub async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut processed_texts = Vec::new();
        let mut empty_positions = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            let processed = normalize_whitespace(text);
            if processed.is_empty() {
                empty_positions.push(i);
            } else {
                processed_texts.push(processed);
            }
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for chunk in processed_texts.chunks(MAX_BATCH_SIZE) {
            debug!("Embedding batch of {} texts", chunk.len());
            let chunk_embeddings = self
                .retry
                .run("embedding batch", || {
                    self.client.generate_batch(chunk.iter().map(String::as_str).collect())
                })
                .await?;
            embeddings.extend(chunk_embeddings);
        }

        for embedding in &embeddings {
            self.check_dimension(embedding)?;
        }

        let zero_vector = vec![0.0; self.config.dimension];
        for pos in empty_positions {
            embeddings.insert(pos, zero_vector.clone());
        }

        Ok(embeddings)
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() == self.config.dimension {
            Ok(())
        } else {
            Err(BikeHeroError::EmbeddingError(format!(
                "Model {} returned {} dimensions, expected {}",
                self.config.model,
                embedding.len(),
                self.config.dimension
            )))
        }
    }

    /// Get the embedding dimension
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// Get the model name
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Get the provider
    #[must_use]
    pub const fn provider(&self) -> ModelProvider {
        self.config.provider
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.generate(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.generate_batch(texts).await
    }
}

/// Collapse newlines, tabs and runs of spaces into single spaces
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("Essential Package:\n- One-time\tservice:  SGD 59\r\n"),
            "Essential Package: - One-time service: SGD 59"
        );
        assert_eq!(normalize_whitespace(" \n\t "), "");
    }

    /// Ollama stand-in answering every prompt with a 4-dimensional vector
    async fn spawn_ollama_stub() -> String {
        use axum::routing::post;
        use axum::Json;
        use axum::Router;

        async fn embed(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
            let words = body["prompt"].as_str().unwrap_or_default().split(' ').count();
            Json(serde_json::json!({ "embedding": [words as f32, 0.0, 0.0, 1.0] }))
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, Router::new().route("/api/embeddings", post(embed)))
                .await
                .unwrap();
        });
        format!("http://{addr}")
    }

    fn ollama_service(endpoint: String, dimension: usize) -> EmbeddingService {
        let config = EmbeddingConfig {
            provider: ModelProvider::Ollama,
            model: "nomic-embed-text".to_string(),
            dimension,
            endpoint,
            api_key: None,
        };
        EmbeddingService::from_config(config, std::time::Duration::from_secs(5), RetryPolicy::none())
            .unwrap()
    }

    #[tokio::test]
    async fn test_ollama_batch_through_embedder() {
        let service: Arc<dyn Embedder> = Arc::new(ollama_service(spawn_ollama_stub().await, 4));

        let texts = vec![
            "Premium package".to_string(),
            "  ".to_string(),
            "wheel truing and\nhub service".to_string(),
        ];
        let embeddings = service.embed_batch(&texts).await.unwrap();

        assert_eq!(
            embeddings,
            vec![
                vec![2.0, 0.0, 0.0, 1.0],
                vec![0.0; 4],
                vec![5.0, 0.0, 0.0, 1.0],
            ]
        );
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let service = ollama_service(spawn_ollama_stub().await, 8);

        let err = service.generate("chain").await.unwrap_err();
        assert!(matches!(err, BikeHeroError::EmbeddingError(_)));
    }

    #[tokio::test]
    async fn test_blank_inputs_get_zero_vectors_without_calls() {
        // Unroutable endpoint: any real request would fail
        let config = EmbeddingConfig {
            provider: ModelProvider::Ollama,
            model: "nomic-embed-text".to_string(),
            dimension: 4,
            endpoint: "http://127.0.0.1:9".to_string(),
            api_key: None,
        };
        let service = EmbeddingService::from_config(
            config,
            std::time::Duration::from_millis(200),
            RetryPolicy::none(),
        )
        .unwrap();

        assert_eq!(service.generate("   ").await.unwrap(), vec![0.0; 4]);
        let batch = service
            .generate_batch(&[String::new(), "\n".to_string()])
            .await
            .unwrap();
        assert_eq!(batch, vec![vec![0.0; 4], vec![0.0; 4]]);
    }
}
