//! Conversational agent for the assistant path.
//!
//! The agent owns no state of its own: it replays the injected per-session
//! conversation history with every call and parses the model's reply out of
//! a fixed answer grammar. Callers pass a session id and input that already
//! carries its own turn markers; the agent concatenates that session's
//! history and the input into one prompt.

pub mod memory;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::errors::AgentError;
use crate::providers::base::{CompletionModel, SamplingParams};

use memory::ConversationMemory;

/// Instruction exchange prepended to every conversational prompt. The model
/// is told to mark its reply with the cue that [`parse_reply`] looks for;
/// anything before the cue is treated as discarded reasoning.
const AGENT_PREAMBLE: &str = "\n\nHuman: You are a conversational assistant for the Echo banking service.\nThink through each request, then write your reply on a final line starting with \"Final Answer:\".\nEverything before that line is discarded.\n\nAssistant: Understood.";

/// Cue separating the model's reasoning from its reply.
const ANSWER_CUE: &str = "Final Answer:";

/// Conversational seam between the fulfillment handler and the model.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Run one exchange under `session_id`. `input` is a rendered turn
    /// ending with the assistant cue; the returned string is the bare
    /// reply text.
    async fn converse(&self, session_id: &str, input: &str) -> Result<String>;
}

/// Agent bound to a completion model and an injected conversation history.
pub struct ConversationalAgent {
    model: Arc<dyn CompletionModel>,
    memory: Arc<dyn ConversationMemory>,
    max_tokens: u32,
}

impl ConversationalAgent {
    pub fn new(
        model: Arc<dyn CompletionModel>,
        memory: Arc<dyn ConversationMemory>,
        max_tokens: u32,
    ) -> Self {
        Self {
            model,
            memory,
            max_tokens,
        }
    }

    async fn build_prompt(&self, session_id: &str, input: &str) -> String {
        let turns = self.memory.history(session_id).await;
        let mut prompt = String::from(AGENT_PREAMBLE);
        for turn in &turns {
            // Stored human turns carry their own markers and end with the
            // assistant cue, so the reply attaches after a single space.
            prompt.push_str(&turn.human);
            prompt.push(' ');
            prompt.push_str(&turn.assistant);
        }
        prompt.push_str(input);
        prompt
    }
}

/// Extract the reply after the last answer cue. Output without the cue is a
/// parse failure carrying the full raw completion.
fn parse_reply(completion: &str) -> Result<String, AgentError> {
    match completion.rsplit_once(ANSWER_CUE) {
        Some((_, answer)) => Ok(answer.trim().to_string()),
        None => Err(AgentError::UnparsedOutput {
            raw: completion.to_string(),
        }),
    }
}

#[async_trait]
impl Agent for ConversationalAgent {
    async fn converse(&self, session_id: &str, input: &str) -> Result<String> {
        let prompt = self.build_prompt(session_id, input).await;
        let params = SamplingParams::answer_cap(self.max_tokens);

        debug!(
            "ConversationalAgent::converse session={} model={} prompt_len={} max_tokens={}",
            session_id,
            self.model.model_id(),
            prompt.len(),
            self.max_tokens
        );

        let completion = self.model.complete(&prompt, &params).await?;
        let answer = parse_reply(&completion.text)?;
        self.memory.append_turn(session_id, input, &answer).await;
        Ok(answer)
    }
}
