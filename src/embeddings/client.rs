//! Embedding API clients for various providers

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::ModelProvider;
use crate::errors::BikeHeroError;
use crate::errors::Result;

const SERVICE: &str = "embeddings";

/// Client for generating embeddings from various providers
pub struct EmbeddingClient {
    provider: ModelProvider,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(
        provider: ModelProvider,
        model: String,
        endpoint: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BikeHeroError::HttpError(e.to_string()))?;

        Ok(Self {
            provider,
            model,
            endpoint,
            api_key,
            client,
        })
    }

    /// Generate embedding for a single text
    ///
    /// # Errors
    /// - Transport failures and timeouts (`HttpError`)
    /// - Non-success responses (`UpstreamStatus`)
    /// - Malformed or empty responses (`EmbeddingError`)
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        match self.provider {
            ModelProvider::OpenAI => {
                let mut embeddings = self.generate_batch_openai(vec![text]).await?;
                embeddings.pop().ok_or_else(|| {
                    BikeHeroError::EmbeddingError("No embedding in response".to_string())
                })
            }
            ModelProvider::Ollama => self.generate_ollama(text).await,
        }
    }

    /// Generate embeddings for multiple texts in batch
    pub async fn generate_batch(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        match self.provider {
            ModelProvider::OpenAI => self.generate_batch_openai(texts).await,
            ModelProvider::Ollama => {
                // Ollama has no batch endpoint
                use futures::stream::StreamExt;
                use futures::stream::{
                    self,
                };

                let concurrency = texts.len().clamp(1, 8);
                let owned: Vec<String> = texts.into_iter().map(str::to_owned).collect();
                let results: Vec<Result<Vec<f32>>> = stream::iter(owned)
                    .map(|text| async move { self.generate_ollama(&text).await })
                    .buffered(concurrency)
                    .collect()
                    .await;

                results.into_iter().collect()
            }
        }
    }

    /// Generate embeddings in batch using `OpenAI` API
    async fn generate_batch_openai(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let api_key = self
            .api_key
            .as_ref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| BikeHeroError::ConfigError("OpenAI API key not provided".to_string()))?;

        #[derive(Serialize)]
        struct OpenAIBatchRequest<'a> {
            input: Vec<&'a str>,
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            #[serde(default)]
            index: usize,
            embedding: Vec<f32>,
        }

        let url = format!("{}/embeddings", self.endpoint);
        let expected = texts.len();
        debug!("Calling OpenAI embeddings API: {} items", expected);

        let request = OpenAIBatchRequest {
            input: texts,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| BikeHeroError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BikeHeroError::UpstreamStatus {
                service: SERVICE,
                status,
                body,
            });
        }

        let mut result: OpenAIResponse = response.json().await.map_err(|e| {
            BikeHeroError::EmbeddingError(format!("Failed to parse response: {e}"))
        })?;

        if result.data.len() != expected {
            return Err(BikeHeroError::EmbeddingError(format!(
                "Expected {expected} embeddings, got {}",
                result.data.len()
            )));
        }
        result.data.sort_by_key(|d| d.index);

        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }

    /// Generate embedding using Ollama API
    async fn generate_ollama(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.endpoint);
        debug!("Calling Ollama embeddings API: {}", url);

        let request = OllamaRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| BikeHeroError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BikeHeroError::UpstreamStatus {
                service: SERVICE,
                status,
                body,
            });
        }

        let result: OllamaResponse = response.json().await.map_err(|e| {
            BikeHeroError::EmbeddingError(format!("Failed to parse response: {e}"))
        })?;

        Ok(result.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Local stand-in for Ollama's `/api/embeddings`
    ///
    /// The vector encodes the prompt length; longer prompts answer sooner so
    /// responses arrive out of request order.
    async fn spawn_ollama_stub() -> String {
        use axum::routing::post;
        use axum::Json;
        use axum::Router;

        async fn embed(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
            let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
            let delay = 60u64.saturating_sub(prompt.len() as u64 * 10);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Json(serde_json::json!({ "embedding": [prompt.len() as f32, 1.0] }))
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

    #[tokio::test]
    async fn test_ollama_batch_keeps_input_order() {
        let client = EmbeddingClient::new(
            ModelProvider::Ollama,
            "nomic-embed-text".to_string(),
            spawn_ollama_stub().await,
            None,
            Duration::from_secs(5),
        )
        .unwrap();

        let embeddings = client
            .generate_batch(vec!["a", "gears", "brake pads"])
            .await
            .unwrap();
        assert_eq!(
            embeddings,
            vec![vec![1.0, 1.0], vec![5.0, 1.0], vec![10.0, 1.0]]
        );

        assert_eq!(client.generate("hub").await.unwrap(), vec![3.0, 1.0]);
    }

    #[tokio::test]
    async fn test_ollama_error_status_is_upstream_error() {
        let client = EmbeddingClient::new(
            ModelProvider::Ollama,
            "nomic-embed-text".to_string(),
            format!("{}/missing", spawn_ollama_stub().await),
            None,
            Duration::from_secs(5),
        )
        .unwrap();

        let err = client.generate_batch(vec!["chain"]).await.unwrap_err();
        assert!(matches!(
            err,
            BikeHeroError::UpstreamStatus {
                service: "embeddings",
                status: 404,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_openai_key_is_config_error() {
        let client = EmbeddingClient::new(
            ModelProvider::OpenAI,
            "text-embedding-3-small".to_string(),
            "https://api.openai.com/v1".to_string(),
            Some(String::new()),
            Duration::from_secs(1),
        )
        .unwrap();

        let err = client.generate("brakes").await.unwrap_err();
        assert!(matches!(err, BikeHeroError::ConfigError(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    #[ignore = "Requires API key"]
    async fn test_openai_embedding() {
        let client = EmbeddingClient::new(
            ModelProvider::OpenAI,
            "text-embedding-3-small".to_string(),
            "https://api.openai.com/v1".to_string(),
            std::env::var("OPENAI_API_KEY").ok(),
            Duration::from_secs(30),
        )
        .unwrap();

        let embedding = client.generate("How much is a tune-up?").await.unwrap();
        assert_eq!(embedding.len(), 1536);
    }
}
