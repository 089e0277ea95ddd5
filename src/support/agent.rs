//! Support conversation orchestrator
//!
//! classify -> retrieve -> generate -> detect escalation -> policy outcome

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::policy::ResponsePolicy;
use super::policy::Situation;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::knowledge::ContextRetriever;
use crate::llm::CompletionRequest;
use crate::llm::CompletionService;
use crate::llm::SupportPrompts;
use crate::models::ConversationTurn;
use crate::models::ResponseOutcome;

/// Most recent turns included in prompts
pub const HISTORY_TURNS: usize = 5;

/// Pricing passages retrieved per message
pub const CONTEXT_DOCUMENTS: usize = 3;

const ESCALATION_PHRASE: &str = "transfer to human agent";

/// Render the last [`HISTORY_TURNS`] turns for a prompt
///
/// Empty history renders as an empty string.
pub fn render_history(history: &[ConversationTurn]) -> String {
    if history.is_empty() {
        return String::new();
    }

    let start = history.len().saturating_sub(HISTORY_TURNS);
    let mut rendered = String::from("Chat History:\n");
    for turn in &history[start..] {
        rendered.push_str(&format!("{}: {}\n", turn.role.label(), turn.content));
    }
    rendered
}

/// Whether a generated answer asks for a human hand-off
///
/// Matches the escalation phrase the system prompt instructs the model to
/// use, in any letter case. Paraphrases are not detected.
pub fn detect_escalation(reply: &str) -> bool {
    reply.to_lowercase().contains(ESCALATION_PHRASE)
}

/// Answers support messages from retrieved pricing context
pub struct SupportAgent {
    completion: Arc<dyn CompletionService>,
    retriever: Arc<dyn ContextRetriever>,
    policy: ResponsePolicy,
    system_prompt: String,
    classifier_temperature: f32,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    top_k: usize,
}

impl SupportAgent {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        retriever: Arc<dyn ContextRetriever>,
        policy: ResponsePolicy,
    ) -> Self {
        let system_prompt = SupportPrompts::system_for(policy.booking_url());
        Self {
            completion,
            retriever,
            policy,
            system_prompt,
            classifier_temperature: 0.0,
            temperature: None,
            max_tokens: None,
            top_k: CONTEXT_DOCUMENTS,
        }
    }

    /// Agent using the `llm`, `knowledge` and `support` sections
    pub fn from_config(
        config: &AppConfig,
        completion: Arc<dyn CompletionService>,
        retriever: Arc<dyn ContextRetriever>,
    ) -> Self {
        let mut agent = Self::new(
            completion,
            retriever,
            ResponsePolicy::new(config.booking_url()),
        );
        agent.classifier_temperature = config.llm.classifier_temperature;
        agent.temperature = Some(config.llm.temperature);
        agent.max_tokens = Some(config.llm.max_tokens);
        agent.top_k = config.knowledge.top_k;
        agent
    }

    /// Handle one user message; failures become escalation outcomes
    pub async fn process(&self, message: &str, history: &[ConversationTurn]) -> ResponseOutcome {
        let situation = match self.handle(message, history).await {
            Ok(situation) => situation,
            Err(e) => {
                error!("Failed to process support message: {}", e);
                Situation::Failed(e.to_string())
            }
        };

        let outcome = self.policy.resolve(situation);
        info!(
            "Processed message: requires_human={}, topic={:?}",
            outcome.metadata.requires_human, outcome.metadata.topic
        );
        outcome
    }

    async fn handle(&self, message: &str, history: &[ConversationTurn]) -> Result<Situation> {
        let rendered = render_history(history);

        if !self.is_relevant(message, &rendered).await? {
            debug!("Message classified as off-topic");
            return Ok(Situation::OffTopic);
        }

        let context = match self.retriever.retrieve(message, self.top_k).await {
            Ok(passages) => passages.join("\n\n"),
            Err(e) => {
                warn!("Pricing retrieval failed: {}", e);
                return Ok(Situation::RetrievalFailed(e.to_string()));
            }
        };

        let reply = self.generate(message, &rendered, &context).await?;
        if detect_escalation(&reply) {
            return Ok(Situation::NeedsHuman);
        }
        Ok(Situation::Answered(reply))
    }

    async fn is_relevant(&self, message: &str, history: &str) -> Result<bool> {
        let content = SupportPrompts::classification_input()
            .render(&HashMap::from([("history", history), ("message", message)]));
        let request = CompletionRequest::new(SupportPrompts::classifier().render(&HashMap::new()), content)
            .with_temperature(self.classifier_temperature);

        let reply = self.completion.complete(&request).await?;
        debug!("Relevance classification: {}", reply.trim());
        Ok(reply.to_lowercase().contains("yes"))
    }

    async fn generate(&self, message: &str, history: &str, context: &str) -> Result<String> {
        let content = SupportPrompts::generation_input().render(&HashMap::from([
            ("context", context),
            ("history", history),
            ("message", message),
        ]));

        let mut request = CompletionRequest::new(self.system_prompt.clone(), content);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        self.completion.complete(&request).await
    }
}
