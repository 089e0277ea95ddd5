use thiserror::Error;

#[derive(Error, Debug)]
pub enum BikeHeroError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("{service} returned HTTP {status}: {body}")]
    UpstreamStatus {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Knowledge store not initialized for namespace '{0}'. Call initialize() first.")]
    NotInitialized(String),

    #[error("Invalid pricing catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid chunk configuration: chunk_size={size}, chunk_overlap={overlap}")]
    InvalidChunkConfig { size: usize, overlap: usize },

    #[error("{0}")]
    Custom(String),
}

impl BikeHeroError {
    /// Whether retrying the same request could succeed
    ///
    /// Transport failures (connect errors, timeouts), rate limiting and
    /// server-side errors are transient. Everything else is returned as-is.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpError(_) => true,
            Self::UpstreamStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<config::ConfigError> for BikeHeroError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BikeHeroError>;
