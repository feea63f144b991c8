//! Intent-request fulfillment: routing and the two reply paths.
//!
//! One event comes in, one envelope goes out. Events with a non-empty
//! transcript take the assistant path (agent + per-session history), which
//! accepts dialog code hook invocations only; events with an empty
//! transcript take the search-grounded path (retrieve, embed, complete)
//! whatever the invocation source. Both paths end in a fulfilled close
//! envelope. Failures other than the recoverable agent parse failure abort
//! the invocation.

pub mod formatter;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::agent::memory::InMemoryHistory;
use crate::agent::{Agent, ConversationalAgent};
use crate::config::schema::{Config, QueryMode};
use crate::errors::{recover_unparsed_output, FulfillmentError};
use crate::lex::event::{IntentEvent, DIALOG_CODE_HOOK};
use crate::lex::response::LexResponse;
use crate::prompt::PromptTemplate;
use crate::providers::base::{CompletionModel, SamplingParams};
use crate::providers::bedrock::BedrockClient;
use crate::retrieval::kendra::KendraClient;
use crate::retrieval::RetrievalIndex;

use formatter::ResponseFormatter;

/// Routes one intent-request event to a reply path and wraps the result in
/// the outbound envelope.
pub struct FulfillmentHandler {
    agent: Arc<dyn Agent>,
    model: Arc<dyn CompletionModel>,
    index: Arc<dyn RetrievalIndex>,
    template: PromptTemplate,
    formatter: ResponseFormatter,
    query_mode: QueryMode,
    literal_query: String,
}

impl FulfillmentHandler {
    /// Build a handler around injected collaborators.
    pub fn new(
        agent: Arc<dyn Agent>,
        model: Arc<dyn CompletionModel>,
        index: Arc<dyn RetrievalIndex>,
        config: &Config,
    ) -> Result<Self> {
        Ok(Self {
            agent,
            model,
            index,
            template: config.prompt.clone(),
            formatter: ResponseFormatter::from_config(config)?,
            query_mode: config.retrieval.query_mode,
            literal_query: config.retrieval.literal_query.clone(),
        })
    }

    /// Wire the production collaborators from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let model: Arc<dyn CompletionModel> = Arc::new(BedrockClient::from_config(config));
        let memory = Arc::new(InMemoryHistory::new(config.llm.max_history_turns));
        let agent: Arc<dyn Agent> = Arc::new(ConversationalAgent::new(
            Arc::clone(&model),
            memory,
            config.llm.agent_max_tokens,
        ));
        let index: Arc<dyn RetrievalIndex> = Arc::new(KendraClient::from_config(config));
        Self::new(agent, model, index, config)
    }

    /// Process one event end to end.
    pub async fn handle(&self, event: &IntentEvent) -> Result<LexResponse> {
        info!(
            "Handling intent {} transcript_len={}",
            event.session_state.intent.name,
            event.input_transcript.len()
        );

        let text = if !event.input_transcript.is_empty() {
            // Only the assistant path is bound to the dialog code hook.
            if event.invocation_source != DIALOG_CODE_HOOK {
                return Err(FulfillmentError::UnsupportedInvocationSource(
                    event.invocation_source.clone(),
                )
                .into());
            }
            self.assistant_reply(&event.session_id, &event.input_transcript)
                .await?
        } else {
            self.search_grounded(&event.input_transcript).await?
        };

        Ok(self.formatter.close_fulfilled(event, &text))
    }

    /// Assistant path: wrap the transcript in a rendered turn, run the
    /// agent under the event's session, and recover best-effort answers
    /// from parse failures. Any other agent failure propagates unchanged.
    async fn assistant_reply(&self, session_id: &str, transcript: &str) -> Result<String> {
        let input = format!("\n\nHuman: {} \n\nAssistant:", transcript);
        match self.agent.converse(session_id, &input).await {
            Ok(text) => Ok(text),
            Err(e) => match recover_unparsed_output(&e.to_string()) {
                Some(answer) => {
                    debug!("Recovered answer text from agent parse failure");
                    Ok(answer)
                }
                None => Err(e),
            },
        }
    }

    /// Search path: query the retrieval index, embed the serialized result
    /// as grounding context, and ask the model directly.
    async fn search_grounded(&self, transcript: &str) -> Result<String> {
        let query = match self.query_mode {
            QueryMode::Literal => self.literal_query.as_str(),
            QueryMode::Transcript => transcript,
        };
        let result = self.index.retrieve(query).await?;
        debug!("Retrieved {} passages", result.result_items.len());

        let context = serde_json::to_string(&result)?;
        let prompt = self.template.render(transcript, &context);
        let completion = self
            .model
            .complete(&prompt, &SamplingParams::grounded())
            .await?;
        Ok(completion.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Mutex;

    use crate::providers::base::Completion;
    use crate::retrieval::RetrieveResult;

    struct MockAgent {
        outcome: Result<String, String>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MockAgent {
        fn replying(text: &str) -> Self {
            Self {
                outcome: Ok(text.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                outcome: Err(message.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Agent for MockAgent {
        async fn converse(&self, session_id: &str, input: &str) -> Result<String> {
            self.calls
                .lock()
                .await
                .push((session_id.to_string(), input.to_string()));
            match &self.outcome {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(anyhow!("{}", message)),
            }
        }
    }

    struct MockModel {
        completion: String,
        prompts: Mutex<Vec<String>>,
    }

    impl MockModel {
        fn new(completion: &str) -> Self {
            Self {
                completion: completion.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionModel for MockModel {
        async fn complete(&self, prompt: &str, _params: &SamplingParams) -> Result<Completion> {
            self.prompts.lock().await.push(prompt.to_string());
            Ok(Completion {
                text: self.completion.clone(),
                stop_reason: None,
            })
        }

        fn model_id(&self) -> &str {
            "mock-model"
        }
    }

    struct MockIndex {
        result: serde_json::Value,
        queries: Mutex<Vec<String>>,
    }

    impl MockIndex {
        fn new(result: serde_json::Value) -> Self {
            Self {
                result,
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RetrievalIndex for MockIndex {
        async fn retrieve(&self, query: &str) -> Result<RetrieveResult> {
            self.queries.lock().await.push(query.to_string());
            Ok(serde_json::from_value(self.result.clone())?)
        }
    }

    fn make_event(transcript: &str) -> IntentEvent {
        serde_json::from_value(json!({
            "inputTranscript": transcript,
            "invocationSource": "DialogCodeHook",
            "sessionState": {"intent": {"name": "FallbackIntent"}},
            "sessionId": "s-1"
        }))
        .unwrap()
    }

    fn make_handler(
        agent: Arc<MockAgent>,
        model: Arc<MockModel>,
        index: Arc<MockIndex>,
        config: &Config,
    ) -> FulfillmentHandler {
        FulfillmentHandler::new(agent, model, index, config).unwrap()
    }

    fn default_parts() -> (Arc<MockAgent>, Arc<MockModel>, Arc<MockIndex>) {
        (
            Arc::new(MockAgent::replying("agent says hi")),
            Arc::new(MockModel::new("model says hi")),
            Arc::new(MockIndex::new(json!({"ResultItems": []}))),
        )
    }

    #[tokio::test]
    async fn test_assistant_path_rejects_other_sources() {
        let (agent, model, index) = default_parts();
        let handler = make_handler(agent, model, index, &Config::default());

        let mut event = make_event("hi");
        event.invocation_source = "FulfillmentCodeHook".to_string();

        let err = handler.handle(&event).await.unwrap_err();
        assert!(err.downcast_ref::<FulfillmentError>().is_some());
        assert_eq!(
            err.to_string(),
            "Unsupported invocation source: FulfillmentCodeHook"
        );
    }

    #[tokio::test]
    async fn test_nonempty_transcript_routes_to_agent() {
        let (agent, model, index) = default_parts();
        let handler = make_handler(
            Arc::clone(&agent),
            Arc::clone(&model),
            Arc::clone(&index),
            &Config::default(),
        );

        let resp = handler
            .handle(&make_event("What is my loan balance?"))
            .await
            .unwrap();

        assert_eq!(resp.first_text(), Some("agent says hi"));
        let calls = agent.calls.lock().await;
        assert_eq!(calls[0].0, "s-1");
        assert_eq!(
            calls[0].1,
            "\n\nHuman: What is my loan balance? \n\nAssistant:"
        );
        // Neither the model nor the index is touched directly.
        assert!(model.prompts.lock().await.is_empty());
        assert!(index.queries.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_transcript_routes_to_search() {
        let (agent, model, index) = default_parts();
        let handler = make_handler(
            Arc::clone(&agent),
            Arc::clone(&model),
            Arc::clone(&index),
            &Config::default(),
        );

        let resp = handler.handle(&make_event("")).await.unwrap();

        assert_eq!(resp.first_text(), Some("model says hi"));
        assert!(agent.calls.lock().await.is_empty());
        let queries = index.queries.lock().await;
        assert_eq!(queries[0], "get me wiki");
    }

    #[tokio::test]
    async fn test_search_path_accepts_any_invocation_source() {
        let (agent, model, index) = default_parts();
        let handler = make_handler(
            Arc::clone(&agent),
            Arc::clone(&model),
            Arc::clone(&index),
            &Config::default(),
        );

        let mut event = make_event("");
        event.invocation_source = "FulfillmentCodeHook".to_string();

        let resp = handler.handle(&event).await.unwrap();

        assert_eq!(resp.first_text(), Some("model says hi"));
        let queries = index.queries.lock().await;
        assert_eq!(queries[0], "get me wiki");
        assert!(agent.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_transcript_query_mode_sends_transcript() {
        let (agent, model, index) = default_parts();
        let mut cfg = Config::default();
        cfg.retrieval.query_mode = QueryMode::Transcript;
        let handler = make_handler(agent, model, Arc::clone(&index), &cfg);

        handler.handle(&make_event("")).await.unwrap();

        let queries = index.queries.lock().await;
        assert_eq!(queries[0], "");
    }

    #[tokio::test]
    async fn test_search_prompt_embeds_serialized_result() {
        let (agent, model, _) = default_parts();
        let index = Arc::new(MockIndex::new(json!({
            "ResultItems": [{"Content": "rates are 5%", "DocumentURI": "https://example.com/r"}]
        })));
        let handler = make_handler(agent, Arc::clone(&model), index, &Config::default());

        handler.handle(&make_event("")).await.unwrap();

        let prompts = model.prompts.lock().await;
        assert!(prompts[0].contains(r#""Content":"rates are 5%""#));
        assert!(prompts[0].contains(r#""DocumentURI":"https://example.com/r""#));
        assert!(prompts[0].starts_with("\n\nHuman:"));
    }

    #[tokio::test]
    async fn test_recoverable_parse_failure_becomes_answer() {
        let agent = Arc::new(MockAgent::failing(
            "Could not parse LLM output: `Your balance is $200`",
        ));
        let (_, model, index) = default_parts();
        let handler = make_handler(agent, model, index, &Config::default());

        let resp = handler.handle(&make_event("balance?")).await.unwrap();
        assert_eq!(resp.first_text(), Some("Your balance is $200"));
    }

    #[tokio::test]
    async fn test_other_agent_failures_propagate() {
        let agent = Arc::new(MockAgent::failing("connection reset by peer"));
        let (_, model, index) = default_parts();
        let handler = make_handler(agent, model, index, &Config::default());

        let err = handler.handle(&make_event("balance?")).await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset by peer");
    }

    #[tokio::test]
    async fn test_close_envelope_marks_intent_fulfilled() {
        let (agent, model, index) = default_parts();
        let handler = make_handler(agent, model, index, &Config::default());

        let resp = handler.handle(&make_event("hi")).await.unwrap();
        let intent = resp.session_state.intent.as_ref().unwrap();
        assert_eq!(intent.state.as_deref(), Some("Fulfilled"));
        assert_eq!(resp.messages.len(), 1);
    }
}
