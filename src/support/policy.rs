//! Maps what happened while handling a message to the user-facing outcome

use crate::models::OutcomeMetadata;
use crate::models::ResponseOutcome;
use crate::models::Topic;

/// What the orchestrator concluded about a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Situation {
    /// The message is not about BikeHero services
    OffTopic,
    /// The generated answer asked for a human hand-off
    NeedsHuman,
    /// Pricing context could not be retrieved
    RetrievalFailed(String),
    /// Classification or generation failed
    Failed(String),
    /// A grounded answer was generated
    Answered(String),
}

/// Produces every user-facing response text
#[derive(Debug, Clone)]
pub struct ResponsePolicy {
    booking_url: String,
}

impl ResponsePolicy {
    pub fn new(booking_url: impl Into<String>) -> Self {
        Self {
            booking_url: booking_url.into(),
        }
    }

    pub fn booking_url(&self) -> &str {
        &self.booking_url
    }

    pub fn resolve(&self, situation: Situation) -> ResponseOutcome {
        match situation {
            Situation::OffTopic => outcome(
                "I'm here to help with BikeHero's bicycle maintenance services. Could you please ask me about our bike maintenance packages, pricing, or other BikeHero-related services?".to_string(),
                false,
                Some(Topic::OffTopic),
                None,
            ),
            Situation::NeedsHuman => outcome(
                format!(
                    "I apologize, but I don't have enough information to fully answer your question.\n\n\
                     To better assist you, you can:\n\n\
                     1. **Provide your contact information** - Please share your name, phone number, and email so we can contact you directly\n\n\
                     2. **Book directly online** - Visit our booking system at {} to schedule your service\n\n\
                     How would you prefer to proceed?",
                    self.booking_url
                ),
                true,
                Some(Topic::BikeheroServices),
                None,
            ),
            Situation::RetrievalFailed(error) => outcome(
                format!(
                    "I apologize, but I'm having trouble accessing the pricing information right now.\n\n\
                     To better assist you, you can:\n\n\
                     1. Provide your contact information - Please share your name, phone number, and email so we can contact you directly\n\n\
                     2. Book directly online - Visit our booking system at {} to schedule your service\n\n\
                     How would you prefer to proceed?",
                    self.booking_url
                ),
                true,
                Some(Topic::BikeheroServices),
                Some(error),
            ),
            Situation::Failed(error) => outcome(
                format!(
                    "Transfer to human agent\n\n\
                     To better assist you, you can:\n\n\
                     1. **Provide your contact information** - Please share your name, phone number, and email so we can contact you directly\n\n\
                     2. **Book directly online** - Visit our booking system at {} to schedule your service",
                    self.booking_url
                ),
                true,
                None,
                Some(error),
            ),
            Situation::Answered(content) => {
                outcome(content, false, Some(Topic::BikeheroServices), None)
            }
        }
    }
}

fn outcome(
    response: String,
    requires_human: bool,
    topic: Option<Topic>,
    error: Option<String>,
) -> ResponseOutcome {
    ResponseOutcome {
        response,
        metadata: OutcomeMetadata {
            requires_human,
            topic,
            error,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://bikehero.sg/goifnmnf";

    fn policy() -> ResponsePolicy {
        ResponsePolicy::new(URL)
    }

    #[test]
    fn test_off_topic() {
        let outcome = policy().resolve(Situation::OffTopic);
        assert!(!outcome.requires_human());
        assert_eq!(outcome.metadata.topic, Some(Topic::OffTopic));
        assert!(outcome.metadata.error.is_none());
        assert!(outcome.response.starts_with("I'm here to help with BikeHero's"));
    }

    #[test]
    fn test_needs_human_offers_contact_and_booking() {
        let outcome = policy().resolve(Situation::NeedsHuman);
        assert!(outcome.requires_human());
        assert_eq!(outcome.metadata.topic, Some(Topic::BikeheroServices));
        assert!(outcome.response.contains("**Provide your contact information**"));
        assert!(outcome
            .response
            .contains(&format!("Visit our booking system at {URL} to schedule")));
    }

    #[test]
    fn test_retrieval_failure_keeps_error() {
        let outcome = policy().resolve(Situation::RetrievalFailed("index offline".to_string()));
        assert!(outcome.requires_human());
        assert_eq!(outcome.metadata.topic, Some(Topic::BikeheroServices));
        assert_eq!(outcome.metadata.error.as_deref(), Some("index offline"));
        assert!(outcome.response.contains("trouble accessing the pricing information"));
        assert!(outcome.response.contains(URL));
    }

    #[test]
    fn test_generic_failure_has_no_topic() {
        let outcome = policy().resolve(Situation::Failed("timeout".to_string()));
        assert!(outcome.requires_human());
        assert!(outcome.metadata.topic.is_none());
        assert_eq!(outcome.metadata.error.as_deref(), Some("timeout"));
        assert!(outcome.response.starts_with("Transfer to human agent"));
        assert!(outcome.response.contains(URL));
    }

    #[test]
    fn test_answer_is_verbatim() {
        let answer = "The Essential package costs SGD 59 for a one-time service.";
        let outcome = policy().resolve(Situation::Answered(answer.to_string()));
        assert!(!outcome.requires_human());
        assert_eq!(outcome.response, answer);
        assert_eq!(outcome.metadata.topic, Some(Topic::BikeheroServices));
    }

    #[test]
    fn test_booking_url_is_configurable() {
        let outcome = ResponsePolicy::new("https://example.test/book").resolve(Situation::NeedsHuman);
        assert!(outcome.response.contains("https://example.test/book"));
        assert!(!outcome.response.contains(URL));
    }
}
