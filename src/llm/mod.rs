//! Language model providers
//!
//! Every provider is a thin HTTP client behind [`LanguageModel`]: a prompt
//! goes in, completion text comes out. Inference itself happens elsewhere.

mod huggingface;
mod ollama;
mod openai;

pub use huggingface::*;
pub use ollama::*;
pub use openai::*;

use crate::config::{LlmConfig, LlmProvider};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Trait for text completion providers
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a single prompt
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model identifier
    fn model_name(&self) -> &str;
}

/// Create the configured language model client
pub fn create_llm(config: &LlmConfig) -> Result<Arc<dyn LanguageModel>> {
    let api_key = config.api_key();
    if !config.api_key_env.is_empty() && api_key.is_none() {
        return Err(Error::Config(format!(
            "llm.api_key_env names '{}' but that environment variable is not set",
            config.api_key_env
        )));
    }
    if config.provider == LlmProvider::HuggingFace && api_key.is_none() {
        return Err(Error::Config(
            "The huggingface provider needs an API token: set llm.api_key_env".to_string(),
        ));
    }

    info!(
        "Using {} language model '{}' at {}",
        config.provider,
        config.model,
        config.effective_base_url()
    );

    let llm: Arc<dyn LanguageModel> = match config.provider {
        LlmProvider::Ollama => Arc::new(OllamaModel::new(config)?),
        LlmProvider::OpenAi => Arc::new(OpenAiModel::new(config, api_key)?),
        LlmProvider::HuggingFace => Arc::new(HuggingFaceModel::new(config, api_key)?),
    };
    Ok(llm)
}

/// Shared HTTP client; the request timeout sits above the chain timeout
fn http_client(config: &LlmConfig) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs.saturating_add(5)))
        .build()?)
}

/// Append `path` to `base`, keeping any path prefix already on `base`
fn endpoint(base: &str, path: &str) -> Result<Url> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let prefixed = format!("{}/", base.path());
        base.set_path(&prefixed);
    }
    base.join(path.trim_start_matches('/'))
        .map_err(|e| Error::Config(format!("Invalid LLM base URL: {}", e)))
}

/// Turn a non-success status into an LLM error carrying the body
async fn check_status(response: Response, provider: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(Error::Llm(format!(
        "{} returned {}: {}",
        provider,
        status,
        body.trim()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_env_is_rejected() {
        let config = LlmConfig {
            provider: LlmProvider::OpenAi,
            api_key_env: "HVAC_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(create_llm(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_huggingface_requires_token() {
        let config = LlmConfig {
            provider: LlmProvider::HuggingFace,
            ..LlmConfig::default()
        };
        assert!(create_llm(&config).is_err());
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let llm = create_llm(&LlmConfig::default()).unwrap();
        assert_eq!(llm.model_name(), "llama2");
    }

    #[test]
    fn test_endpoint_join() {
        let url = endpoint("http://127.0.0.1:11434", "/api/generate").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:11434/api/generate");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = endpoint("https://gw.example/openai", "/v1/chat/completions").unwrap();
        assert_eq!(url.as_str(), "https://gw.example/openai/v1/chat/completions");

        let url = endpoint("https://gw.example/openai/", "/v1/chat/completions").unwrap();
        assert_eq!(url.as_str(), "https://gw.example/openai/v1/chat/completions");

        let url = endpoint("http://127.0.0.1:11434/", "api/generate").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:11434/api/generate");
    }
}
