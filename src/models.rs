use std::collections::BTreeMap;
use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use sqlx::FromRow;

/// Pricing for one maintenance package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagePricing {
    /// Price of a single service, SGD
    pub one_time: Decimal,
    /// Price of the annual package (two services), SGD
    pub annual: Decimal,
    /// Services included in the package
    pub includes: String,
}

/// Optional service sold on top of a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonPricing {
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
}

/// General service information shared by all packages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub turnaround: String,
    pub annual_savings: String,
}

/// Pricing catalog as supplied through the update API or the built-in default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingCatalog {
    pub packages: BTreeMap<String, PackagePricing>,
    pub info: ServiceInfo,
    #[serde(default)]
    pub addons: BTreeMap<String, AddonPricing>,
    #[serde(default)]
    pub policies: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Topic section a pricing document belongs to
///
/// Declaration order is the retrieval tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSection {
    Packages,
    Addons,
    Policies,
    Recommendations,
}

impl DocumentSection {
    pub const ALL: [DocumentSection; 4] = [
        Self::Packages,
        Self::Addons,
        Self::Policies,
        Self::Recommendations,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Packages => "packages",
            Self::Addons => "addons",
            Self::Policies => "policies",
            Self::Recommendations => "recommendations",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.as_str() == value)
    }
}

impl fmt::Display for DocumentSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of indexable content
///
/// `(section, index)` is unique within one indexing generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingDocument {
    pub section: DocumentSection,
    pub index: usize,
    pub title: String,
    pub content: String,
}

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Title-cased label used when rendering history for the model
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// One message of a conversation, ordered most-recent-last
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Topic tag attached to an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    OffTopic,
    BikeheroServices,
}

/// Structured metadata stored alongside every response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeMetadata {
    pub requires_human: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of processing one user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseOutcome {
    pub response: String,
    #[serde(rename = "metadata_info")]
    pub metadata: OutcomeMetadata,
}

impl ResponseOutcome {
    pub fn requires_human(&self) -> bool {
        self.metadata.requires_human
    }
}

/// Support agent record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Agent {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persisted chat exchange
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatExchange {
    pub id: i64,
    pub agent_id: i64,
    pub message: String,
    pub response: String,
    pub metadata_info: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl ChatExchange {
    /// The two turns this exchange contributes to a conversation
    pub fn turns(&self) -> [ConversationTurn; 2] {
        [
            ConversationTurn::user(self.message.clone()),
            ConversationTurn::assistant(self.response.clone()),
        ]
    }
}

/// Request to record a chat exchange
#[derive(Debug, Clone)]
pub struct CreateChatExchangeRequest {
    pub agent_id: i64,
    pub message: String,
    pub outcome: ResponseOutcome,
}
