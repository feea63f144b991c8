//! Bedrock-style completion endpoint client.
//!
//! Speaks the single-prompt invoke protocol (`POST /model/{modelId}/invoke`)
//! with an Anthropic-format body: `prompt`, `max_tokens_to_sample`, and
//! optional sampling fields. Responses carry `completion` text and a
//! `stop_reason`.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::schema::Config;
use crate::errors::ProviderError;

use super::base::{Completion, CompletionModel, SamplingParams};

/// Client for a Bedrock-style model invocation endpoint.
pub struct BedrockClient {
    endpoint: String,
    model: String,
    api_key: String,
    client: Client,
}

impl BedrockClient {
    pub fn new(endpoint: &str, model: &str, api_key: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.llm_endpoint(),
            &config.llm.model,
            &config.llm.api_key,
        )
    }

    fn invoke_url(&self) -> String {
        format!("{}/model/{}/invoke", self.endpoint, self.model)
    }

    /// Build the invoke body for one request. Unset sampling fields are
    /// omitted entirely rather than sent as null.
    fn request_body(prompt: &str, params: &SamplingParams) -> Value {
        let mut body = json!({
            "prompt": prompt,
            "max_tokens_to_sample": params.max_tokens_to_sample,
        });
        if let Some(temperature) = params.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(top_k) = params.top_k {
            body["top_k"] = json!(top_k);
        }
        if let Some(top_p) = params.top_p {
            body["top_p"] = json!(top_p);
        }
        if let Some(stop) = &params.stop_sequences {
            body["stop_sequences"] = json!(stop);
        }
        body
    }

    fn parse_completion(data: &Value) -> Result<Completion, ProviderError> {
        let text = data["completion"]
            .as_str()
            .ok_or(ProviderError::MissingCompletion)?
            .to_string();
        let stop_reason = data["stop_reason"].as_str().map(|s| s.to_string());
        Ok(Completion { text, stop_reason })
    }
}

#[async_trait]
impl CompletionModel for BedrockClient {
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<Completion> {
        let url = self.invoke_url();
        let body = Self::request_body(prompt, params);

        debug!(
            "BedrockClient::complete model={} prompt_len={}",
            self.model,
            prompt.len()
        );

        let mut req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = req
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: response_text,
            }
            .into());
        }

        let data: Value = serde_json::from_str(&response_text)
            .map_err(|e| ProviderError::JsonParseError(e.to_string()))?;

        let completion = Self::parse_completion(&data)?;
        debug!(
            "BedrockClient::complete text_len={} stop_reason={:?}",
            completion.text.len(),
            completion.stop_reason
        );
        Ok(completion)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
