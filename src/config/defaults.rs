//! Default values for configuration

/// Default database file name (relative to the config directory)
pub fn default_database_path() -> String {
    "fieldedge.db".to_string()
}

/// Default: enforce foreign keys
pub fn default_foreign_keys() -> bool {
    true
}

/// Default number of generated customers
pub fn default_seed_customers() -> usize {
    100
}

/// Default number of generated technicians
pub fn default_seed_technicians() -> usize {
    15
}

/// Default number of generated work orders
pub fn default_seed_work_orders() -> usize {
    250
}

/// Default number of generated quotes
pub fn default_seed_quotes() -> usize {
    300
}

/// Earliest customer creation date
pub fn default_customer_start() -> String {
    "2021-01-01".to_string()
}

/// Earliest possible technician hire date
pub fn default_technician_floor() -> String {
    "2020-01-01".to_string()
}

/// Earliest work order / quote creation date
pub fn default_activity_start() -> String {
    "2022-01-01".to_string()
}

/// Default embedding model
pub fn default_embedding_model() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

/// Default embedding dimension (all-MiniLM-L6-v2)
pub fn default_embedding_dimension() -> usize {
    384
}

/// Default batch size for embedding
pub fn default_embedding_batch_size() -> usize {
    32
}

/// Default embedding backend URL
pub fn default_embedding_backend_url() -> String {
    std::env::var("HVAC_EMBEDDING_BACKEND_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:7997".to_string())
}

/// Default index directory (relative to the config directory)
pub fn default_index_dir() -> String {
    "index".to_string()
}

/// Default Qdrant gRPC URL for local development (port 6334, not 6333 REST)
pub fn default_qdrant_url() -> String {
    std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://127.0.0.1:6334".to_string())
}

/// Default collection name
pub fn default_collection_name() -> String {
    "hvac_records".to_string()
}

/// Default LLM model
pub fn default_llm_model() -> String {
    "llama2".to_string()
}

/// Default environment variable holding the LLM API key (none)
pub fn default_llm_api_key_env() -> String {
    "".to_string()
}

/// Default sampling temperature
pub fn default_llm_temperature() -> f32 {
    0.3
}

/// Default maximum generated tokens
pub fn default_llm_max_tokens() -> u32 {
    512
}

/// Default LLM request timeout in seconds
pub fn default_llm_timeout() -> u64 {
    60
}

/// Default number of retrieved chunks
pub fn default_retrieval_top_k() -> usize {
    4
}

/// Default minimum similarity score
pub fn default_retrieval_min_score() -> f32 {
    0.0
}

/// Default HTTP bind address
pub fn default_server_bind() -> String {
    "127.0.0.1:5000".to_string()
}
