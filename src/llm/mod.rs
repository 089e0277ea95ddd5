//! Chat completion clients and prompt templates

pub mod client;
pub mod prompts;

use async_trait::async_trait;
pub use client::LlmService;
pub use prompts::PromptTemplate;
pub use prompts::SupportPrompts;

use crate::errors::Result;

/// One instruction-plus-content completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction
    pub instruction: String,
    /// User content
    pub content: String,
    /// Overrides the service default when set
    pub temperature: Option<f32>,
    /// Overrides the service default when set
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(instruction: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            content: content.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Produces a text completion for a request
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
