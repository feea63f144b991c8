//! Base completion model interface.

use anyhow::Result;
use async_trait::async_trait;

/// Sampling parameters sent with a completion request.
///
/// Only `max_tokens_to_sample` is always present on the wire; the optional
/// fields are omitted from the request body when unset so the endpoint
/// applies its own defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub max_tokens_to_sample: u32,
    pub temperature: Option<f64>,
    pub top_k: Option<u32>,
    pub top_p: Option<f64>,
    pub stop_sequences: Option<Vec<String>>,
}

impl SamplingParams {
    /// Conversational settings: only the completion length is constrained.
    pub fn answer_cap(max_tokens: u32) -> Self {
        Self {
            max_tokens_to_sample: max_tokens,
            temperature: None,
            top_k: None,
            top_p: None,
            stop_sequences: None,
        }
    }

    /// Deterministic settings for grounded question answering.
    pub fn grounded() -> Self {
        Self {
            max_tokens_to_sample: 8191,
            temperature: Some(0.0),
            top_k: Some(250),
            top_p: Some(0.5),
            stop_sequences: Some(Vec::new()),
        }
    }
}

/// Response from a completion model.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub stop_reason: Option<String>,
}

/// Abstract interface to a single-prompt text completion endpoint.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Send one completion request and return the model's text.
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<Completion>;

    /// Model identifier used in request routing and logs.
    fn model_id(&self) -> &str;
}
