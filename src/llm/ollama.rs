//! Ollama `/api/generate` client

use super::{check_status, endpoint, http_client, LanguageModel};
use crate::config::LlmConfig;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Local Ollama server
pub struct OllamaModel {
    client: Client,
    url: Url,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OllamaModel {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            url: endpoint(&config.effective_base_url(), "/api/generate")?,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl LanguageModel for OllamaModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!("Sending {} prompt chars to Ollama", prompt.len());
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await?;
        let parsed: GenerateResponse = check_status(response, "Ollama").await?.json().await?;
        Ok(parsed.response.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
