//! Configuration management for hvac-assistant
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// ISO 8601 date format used for every stored date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Business records database
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Sample data generation
    #[serde(default)]
    pub seed: SeedConfig,

    /// Row-to-text extraction
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Embedding model configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Vector index configuration
    #[serde(default)]
    pub index: IndexConfig,

    /// Language model configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// HTTP front end configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file, relative paths resolve against the config directory
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Enforce foreign key constraints on every connection
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,
}

/// Seed data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_seed_customers")]
    pub customers: usize,

    #[serde(default = "default_seed_technicians")]
    pub technicians: usize,

    #[serde(default = "default_seed_work_orders")]
    pub work_orders: usize,

    #[serde(default = "default_seed_quotes")]
    pub quotes: usize,

    /// Earliest customer creation date
    #[serde(default = "default_customer_start")]
    pub customer_start: String,

    /// Earliest possible technician hire date
    #[serde(default = "default_technician_floor")]
    pub technician_floor: String,

    /// Earliest work order and quote creation date
    #[serde(default = "default_activity_start")]
    pub activity_start: String,

    /// Fixed "now" for generation (defaults to today)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_date: Option<String>,

    /// Seed for the random generator (random when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
}

/// What to do when a single table cannot be extracted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractErrorPolicy {
    /// Log the failure and continue with zero chunks for that table
    #[default]
    Skip,
    /// Stop the whole aggregation
    Abort,
}

/// Extraction configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub on_error: ExtractErrorPolicy,
}

/// Embedding backend kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// In-process FastEmbed model
    #[default]
    Local,
    /// Remote embedding service
    Http,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub backend: EmbeddingBackend,

    /// Model name/identifier
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension (must match model)
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Batch size for embedding
    #[serde(default = "default_embedding_batch_size")]
    pub batch_size: usize,

    /// Base URL of the HTTP embedding service
    #[serde(default = "default_embedding_backend_url")]
    pub backend_url: String,
}

/// Lookup the expected embedding dimension for a known model
pub fn embedding_dimension_for_model(model: &str) -> Option<usize> {
    match model {
        "BAAI/bge-small-en-v1.5" => Some(384),
        "BAAI/bge-base-en-v1.5" => Some(768),
        "BAAI/bge-large-en-v1.5" => Some(1024),
        "sentence-transformers/all-MiniLM-L6-v2" => Some(384),
        "nomic-embed-text" => Some(768),
        _ => None,
    }
}

impl EmbeddingConfig {
    /// Resolve the effective embedding dimension based on the configured model
    pub fn resolved_dimension(&self) -> usize {
        if let Some(expected) = embedding_dimension_for_model(&self.model) {
            if expected != self.dimension {
                warn!(
                    "Embedding dimension {} does not match model '{}' ({}); using {}",
                    self.dimension, self.model, expected, expected
                );
            }
            expected
        } else {
            self.dimension
        }
    }
}

/// Vector index backend kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// On-disk index inside `persist_dir`
    #[default]
    Local,
    /// Qdrant collection
    Qdrant,
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default)]
    pub backend: IndexBackend,

    /// Persistence directory, relative paths resolve against the config directory
    #[serde(default = "default_index_dir")]
    pub persist_dir: String,

    /// Qdrant connection URL
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,

    /// Qdrant collection name
    #[serde(default = "default_collection_name")]
    pub collection_name: String,
}

/// Language model provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Local Ollama server
    #[default]
    Ollama,
    /// Any OpenAI-compatible chat completions endpoint
    OpenAi,
    /// Hugging Face Inference API
    HuggingFace,
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::Ollama => write!(f, "ollama"),
            LlmProvider::OpenAi => write!(f, "openai"),
            LlmProvider::HuggingFace => write!(f, "huggingface"),
        }
    }
}

/// Language model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,

    /// Model identifier (Ollama tag, OpenAI model or Hugging Face repo id)
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Override the provider's default base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Environment variable name holding the API key
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,

    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound on a single completion request
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Base URL for the configured provider
    pub fn effective_base_url(&self) -> String {
        if let Some(url) = &self.base_url {
            return url.clone();
        }
        match self.provider {
            LlmProvider::Ollama => "http://127.0.0.1:11434".to_string(),
            LlmProvider::OpenAi => "https://api.openai.com".to_string(),
            LlmProvider::HuggingFace => "https://api-inference.huggingface.co".to_string(),
        }
    }

    /// Read the API key named by `api_key_env`
    pub fn api_key(&self) -> Option<String> {
        if self.api_key_env.is_empty() {
            return None;
        }
        std::env::var(&self.api_key_env).ok()
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks handed to the language model
    #[serde(default = "default_retrieval_top_k")]
    pub top_k: usize,

    /// Minimum similarity score (0.0 - 1.0)
    #[serde(default = "default_retrieval_min_score")]
    pub min_score: f32,
}

/// HTTP front end configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for hvac-assistant data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Path to the business records database
    pub db_file: PathBuf,

    /// Path to the vector index directory
    pub index_dir: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            foreign_keys: default_foreign_keys(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            customers: default_seed_customers(),
            technicians: default_seed_technicians(),
            work_orders: default_seed_work_orders(),
            quotes: default_seed_quotes(),
            customer_start: default_customer_start(),
            technician_floor: default_technician_floor(),
            activity_start: default_activity_start(),
            anchor_date: None,
            rng_seed: None,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            batch_size: default_embedding_batch_size(),
            backend_url: default_embedding_backend_url(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::default(),
            persist_dir: default_index_dir(),
            qdrant_url: default_qdrant_url(),
            collection_name: default_collection_name(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: default_llm_model(),
            base_url: None,
            api_key_env: default_llm_api_key_env(),
            temperature: default_llm_temperature(),
            max_tokens: default_llm_max_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_retrieval_top_k(),
            min_score: default_retrieval_min_score(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_server_bind(),
        }
    }
}

/// Parse an ISO 8601 date string
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)?)
}

impl SeedConfig {
    /// The generation anchor: configured date or today
    pub fn anchor(&self) -> Result<NaiveDate> {
        match &self.anchor_date {
            Some(date) => parse_date(date),
            None => Ok(Local::now().date_naive()),
        }
    }

    pub fn customer_start_date(&self) -> Result<NaiveDate> {
        parse_date(&self.customer_start)
    }

    pub fn technician_floor_date(&self) -> Result<NaiveDate> {
        parse_date(&self.technician_floor)
    }

    pub fn activity_start_date(&self) -> Result<NaiveDate> {
        parse_date(&self.activity_start)
    }

    fn validate(&self) -> Result<()> {
        let anchor = self.anchor()?;

        for (key, date) in [
            ("seed.customer_start", self.customer_start_date()?),
            ("seed.technician_floor", self.technician_floor_date()?),
            ("seed.activity_start", self.activity_start_date()?),
        ] {
            if date > anchor {
                return Err(Error::Config(format!(
                    "{} ({}) must not be after the anchor date ({})",
                    key, date, anchor
                )));
            }
        }

        if (self.work_orders > 0 || self.quotes > 0) && self.customers == 0 {
            return Err(Error::Config(
                "seed.customers must be >= 1 when work orders or quotes are generated"
                    .to_string(),
            ));
        }

        if self.work_orders > 0 && self.technicians == 0 {
            return Err(Error::Config(
                "seed.technicians must be >= 1 when work orders are generated".to_string(),
            ));
        }

        Ok(())
    }
}

impl Config {
    /// Get the default base directory for hvac-assistant (~/.hvac-assistant)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hvac-assistant")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Resolve data paths relative to a base directory
    pub fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            db_file: resolve_path(&base, &self.database.path),
            index_dir: resolve_path(&base, &self.index.persist_dir),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.init_paths(Some(base));
        config.paths.config_file = config_path.to_path_buf();

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific base directory
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir.clone());

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.init_paths(base_dir);
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Check if hvac-assistant is initialized (config exists)
    pub fn is_initialized(&self) -> bool {
        self.paths.config_file.exists()
    }

    /// Parsed HTTP bind address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server.bind.parse().map_err(|e| {
            Error::Config(format!("server.bind '{}' is invalid: {}", self.server.bind, e))
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.seed.validate()?;

        if self.embedding.batch_size == 0 {
            return Err(Error::Config(
                "embedding.batch_size must be >= 1".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be >= 1".to_string()));
        }

        if self.retrieval.min_score < 0.0 || self.retrieval.min_score > 1.0 {
            return Err(Error::Config(
                "retrieval.min_score must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err(Error::Config("llm.timeout_secs must be >= 1".to_string()));
        }

        if self.llm.model.trim().is_empty() {
            return Err(Error::Config("llm.model must not be empty".to_string()));
        }

        self.bind_addr()?;

        Ok(())
    }
}

fn resolve_path(base: &Path, value: &str) -> PathBuf {
    let candidate = PathBuf::from(value);
    if candidate.is_absolute() {
        candidate
    } else {
        base.join(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.index.collection_name, "hvac_records");
        assert_eq!(config.llm.provider, LlmProvider::Ollama);
        assert_eq!(config.extract.on_error, ExtractErrorPolicy::Skip);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        config.index.collection_name = "test_collection".to_string();
        config.extract.on_error = ExtractErrorPolicy::Abort;

        config.save().unwrap();
        assert!(config.paths.config_file.exists());

        let loaded = Config::load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(loaded.index.collection_name, "test_collection");
        assert_eq!(loaded.extract.on_error, ExtractErrorPolicy::Abort);
        assert_eq!(loaded.paths.db_file, tmp.path().join("fieldedge.db"));
        assert_eq!(loaded.paths.index_dir, tmp.path().join("index"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml = r#"
            [llm]
            provider = "huggingface"
            model = "mistralai/Mistral-7B-Instruct-v0.1"
            api_key_env = "HUGGINGFACEHUB_API_TOKEN"

            [index]
            backend = "qdrant"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.llm.provider, LlmProvider::HuggingFace);
        assert_eq!(
            config.llm.effective_base_url(),
            "https://api-inference.huggingface.co"
        );
        assert_eq!(config.index.backend, IndexBackend::Qdrant);
        assert_eq!(config.seed.customers, 100);
        assert_eq!(config.retrieval.top_k, 4);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.retrieval.min_score = 1.5;
        assert!(config.validate().is_err());
        config.retrieval.min_score = 0.2;
        assert!(config.validate().is_ok());

        config.server.bind = "not-an-address".to_string();
        assert!(config.validate().is_err());
        config.server.bind = default_server_bind();

        config.seed.technicians = 0;
        assert!(config.validate().is_err());
        config.seed.work_orders = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_seed_dates_must_precede_anchor() {
        let mut config = Config::default();
        config.seed.anchor_date = Some("2021-06-01".to_string());
        // activity_start (2022-01-01) is after the anchor
        assert!(config.validate().is_err());

        config.seed.activity_start = "2021-01-01".to_string();
        assert!(config.validate().is_ok());

        config.seed.customer_start = "01/01/2021".to_string();
        assert!(matches!(config.validate(), Err(Error::DateParse(_))));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        let db = tmp.path().join("elsewhere.db");
        config.database.path = db.display().to_string();
        config.init_paths(Some(PathBuf::from("/unused")));
        assert_eq!(config.paths.db_file, db);
    }

    #[test]
    fn test_resolved_dimension_unknown_model_falls_back() {
        let mut config = Config::default();
        config.embedding.model = "custom-model".to_string();
        config.embedding.dimension = 512;

        assert_eq!(config.embedding.resolved_dimension(), 512);
    }
}
