//! Chat completion client for OpenAI-compatible and Ollama endpoints

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::CompletionRequest;
use super::CompletionService;
use crate::config::AppConfig;
use crate::config::ModelProvider;
use crate::errors::BikeHeroError;
use crate::errors::Result;
use crate::retry::RetryPolicy;

const SERVICE: &str = "llm";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completion service
#[derive(Clone)]
pub struct LlmService {
    provider: ModelProvider,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: Client,
    retry: RetryPolicy,
}

impl LlmService {
    /// Create a new LLM service from application config
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BikeHeroError::HttpError(e.to_string()))?;

        Ok(Self {
            provider: config.model_provider(),
            endpoint: config.llm_endpoint().trim_end_matches('/').to_string(),
            api_key: config.llm_key().to_string(),
            model: config.llm_model().to_string(),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
            client,
            retry: RetryPolicy::from_config(&config.http),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete_once(&self, request: &CompletionRequest) -> Result<String> {
        let temperature = request.temperature.unwrap_or(self.temperature);
        let max_tokens = request.max_tokens.unwrap_or(self.max_tokens);
        let messages = [
            ChatMessage {
                role: "system",
                content: &request.instruction,
            },
            ChatMessage {
                role: "user",
                content: &request.content,
            },
        ];

        match self.provider {
            ModelProvider::OpenAI => {
                self.complete_openai(&messages, temperature, max_tokens)
                    .await
            }
            ModelProvider::Ollama => {
                self.complete_ollama(&messages, temperature, max_tokens)
                    .await
            }
        }
    }

    async fn complete_openai(
        &self,
        messages: &[ChatMessage<'_>],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(BikeHeroError::ConfigError(
                "OpenAI API key not provided".to_string(),
            ));
        }

        #[derive(Serialize)]
        struct OpenAIRequest<'a> {
            model: &'a str,
            messages: &'a [ChatMessage<'a>],
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            #[serde(default)]
            content: Option<String>,
        }

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling OpenAI chat completions API: {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&OpenAIRequest {
                model: &self.model,
                messages,
                temperature,
                max_tokens,
            })
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

        let result: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| BikeHeroError::LlmError(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| BikeHeroError::LlmError("No completion in response".to_string()))
    }

    async fn complete_ollama(
        &self,
        messages: &[ChatMessage<'_>],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        #[derive(Serialize)]
        struct OllamaOptions {
            temperature: f32,
            num_predict: u32,
        }

        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            messages: &'a [ChatMessage<'a>],
            stream: bool,
            options: OllamaOptions,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            message: OllamaMessage,
        }

        #[derive(Deserialize)]
        struct OllamaMessage {
            content: String,
        }

        let url = format!("{}/api/chat", self.endpoint);
        debug!("Calling Ollama chat API: {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&OllamaRequest {
                model: &self.model,
                messages,
                stream: false,
                options: OllamaOptions {
                    temperature,
                    num_predict: max_tokens,
                },
            })
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

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| BikeHeroError::LlmError(format!("Failed to parse response: {e}")))?;

        Ok(result.message.content)
    }
}

#[async_trait]
impl CompletionService for LlmService {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.retry
            .run("chat completion", || self.complete_once(request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_fails_without_retry() {
        let mut config = AppConfig::default();
        config.llm.llm_key = String::new();
        let service = LlmService::new(&config).unwrap();

        let err = service
            .complete(&CompletionRequest::new("system", "hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, BikeHeroError::ConfigError(_)));
    }

    #[test]
    fn test_request_overrides() {
        let request = CompletionRequest::new("Classify", "Is this about bikes?")
            .with_temperature(0.0);
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.max_tokens, None);
    }
}
