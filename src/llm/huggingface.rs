//! Hugging Face Inference API client

use super::{check_status, endpoint, http_client, LanguageModel};
use crate::config::LlmConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    temperature: f32,
    max_new_tokens: u32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct Generated {
    generated_text: String,
}

/// Text generation responses come back as a list or a single object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Many(Vec<Generated>),
    One(Generated),
}

/// Hosted model at `/models/{repo}`
pub struct HuggingFaceModel {
    client: Client,
    url: Url,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl HuggingFaceModel {
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            url: endpoint(
                &config.effective_base_url(),
                &format!("/models/{}", config.model),
            )?,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl LanguageModel for HuggingFaceModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters {
                temperature: self.temperature,
                max_new_tokens: self.max_tokens,
                return_full_text: false,
            },
        };

        let mut builder = self.client.post(self.url.clone()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let parsed: InferenceResponse = check_status(response, "Hugging Face Inference API")
            .await?
            .json()
            .await?;

        let generated = match parsed {
            InferenceResponse::Many(list) => list.into_iter().next(),
            InferenceResponse::One(one) => Some(one),
        };
        generated
            .map(|g| g.generated_text.trim().to_string())
            .ok_or_else(|| Error::Llm("Inference API returned no text".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmProvider;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_text_generation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/mistralai/Mistral-7B-Instruct-v0.1"))
            .and(body_partial_json(json!({
                "parameters": {"max_new_tokens": 512, "return_full_text": false}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"generated_text": "Quote 12 was rejected."}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let config = LlmConfig {
            provider: LlmProvider::HuggingFace,
            model: "mistralai/Mistral-7B-Instruct-v0.1".to_string(),
            base_url: Some(server.uri()),
            ..LlmConfig::default()
        };
        let llm = HuggingFaceModel::new(&config, Some("hf_test".to_string())).unwrap();
        assert_eq!(
            llm.complete("Status of quote 12?").await.unwrap(),
            "Quote 12 was rejected."
        );
    }
}
