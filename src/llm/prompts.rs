//! Prompt templates for the support assistant

use std::collections::HashMap;

/// Template with `{{name}}` placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Fill in the template in a single pass
    ///
    /// Substituted values are never rescanned, so user text containing
    /// `{{...}}` is inserted literally. Placeholders without a value are kept.
    #[must_use]
    pub fn render(&self, values: &HashMap<&str, &str>) -> String {
        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find("{{") {
            result.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            match after.find("}}") {
                Some(close) => {
                    let name = &after[..close];
                    match values.get(name) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(name);
                            result.push_str("}}");
                        }
                    }
                    rest = &after[close + 2..];
                }
                None => {
                    result.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }
}

/// Prompts used by the support assistant
pub struct SupportPrompts;

impl SupportPrompts {
    /// System instruction for answer generation
    #[must_use]
    pub fn system() -> PromptTemplate {
        PromptTemplate::new(
            r#"You are a helpful AI assistant for BikeHero bicycle maintenance services.

IMPORTANT RULES:
1. ONLY answer questions about BikeHero's bicycle maintenance services and pricing
2. If the user asks about anything else (cars, other companies, general topics), respond with "Transfer to human agent"
3. If you don't have specific pricing information for their question, respond with "Transfer to human agent"
4. If the question is too complex or requires personal consultation, respond with "Transfer to human agent"
5. If the user wants to book services, respond with "Transfer to human agent"

When you need to transfer to human agent, always provide these options:
1. Provide your name, phone number, and email for follow-up
2. Book directly through our website at {{booking_url}}

PLEASE NOTE: If the user provides their contact information, display the contact information to them and respond with "Thank you for providing your contact information. Please wait for our team to contact you."

Be polite and professional. Add line breaks for better readability."#,
        )
    }

    /// System instruction for the relevance classifier
    #[must_use]
    pub fn classifier() -> PromptTemplate {
        PromptTemplate::new(
            "You are a classifier. Determine if the user's message is related to BikeHero services, bike services in general, OR if they are providing contact information for booking services. Consider the chat history context when making your decision. If the user is providing their name, phone number, email, or other contact details for booking, classify as relevant. Respond with only 'YES' or 'NO'.",
        )
    }

    /// User content for the relevance classifier
    #[must_use]
    pub fn classification_input() -> PromptTemplate {
        PromptTemplate::new("{{history}}\n\nCurrent Message: {{message}}")
    }

    /// User content for answer generation
    #[must_use]
    pub fn generation_input() -> PromptTemplate {
        PromptTemplate::new(
            "Pricing Information:\n{{context}}\n\n{{history}}\n\nUser Question: {{message}}",
        )
    }

    /// Render the system instruction for a booking link
    #[must_use]
    pub fn system_for(booking_url: &str) -> String {
        Self::system().render(&HashMap::from([("booking_url", booking_url)]))
    }
}
