//! Custom error types for hvac-assistant

use thiserror::Error;

/// Main error type for hvac-assistant operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Seed error: {0}")]
    Seed(String),

    #[error("Extraction failed for table {table}: {message}")]
    Extraction { table: String, message: String },

    #[error("Qdrant error: {0}")]
    Qdrant(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Timed out after {0} seconds waiting for the language model")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Date parse error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Database not initialized: run 'hvac-assistant seed' first")]
    NotInitialized,

    #[error("Already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("Index is empty: run 'hvac-assistant index' first")]
    EmptyIndex,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for hvac-assistant
pub type Result<T> = std::result::Result<T, Error>;

/// Convert qdrant errors
impl From<qdrant_client::QdrantError> for Error {
    fn from(err: qdrant_client::QdrantError) -> Self {
        Error::Qdrant(err.to_string())
    }
}

impl Error {
    /// Wrap any failure raised while reading a table
    pub fn extraction(table: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Error::Extraction {
            table: table.to_string(),
            message: err.to_string(),
        }
    }
}
