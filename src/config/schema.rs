//! Configuration schema for lexbot.
//!
//! All structs use `#[serde(rename_all = "camelCase")]` so that the JSON config
//! file can use camelCase keys while Rust code uses snake_case fields. Every
//! field carries a default, so an empty `{}` file yields the shipped
//! deployment configuration.

use serde::{Deserialize, Serialize};

use crate::lex::response::CardButton;
use crate::prompt::PromptTemplate;

// ---------------------------------------------------------------------------
// Completion endpoint config
// ---------------------------------------------------------------------------

/// Completion endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    /// Explicit endpoint override. When unset the endpoint is derived from
    /// the configured region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Optional static bearer token sent with completion requests.
    #[serde(default)]
    pub api_key: String,
    /// Completion cap for conversational (agent-path) requests.
    #[serde(default = "default_agent_max_tokens")]
    pub agent_max_tokens: u32,
    /// Turns of conversation history kept per session; older turns are
    /// dropped.
    #[serde(default = "default_max_history_turns")]
    pub max_history_turns: usize,
}

fn default_model() -> String {
    "anthropic.claude-v2".to_string()
}

fn default_agent_max_tokens() -> u32 {
    350
}

fn default_max_history_turns() -> usize {
    10
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: None,
            api_key: String::new(),
            agent_max_tokens: default_agent_max_tokens(),
            max_history_turns: default_max_history_turns(),
        }
    }
}

// ---------------------------------------------------------------------------
// Retrieval config
// ---------------------------------------------------------------------------

/// What the retrieval index is queried with on the search path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Always send the fixed `literalQuery` string.
    Literal,
    /// Send the user's input transcript.
    Transcript,
}

impl Default for QueryMode {
    fn default() -> Self {
        QueryMode::Literal
    }
}

/// Retrieval index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    #[serde(default = "default_index_id")]
    pub index_id: String,
    /// Explicit endpoint override. When unset the endpoint is derived from
    /// the configured region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub query_mode: QueryMode,
    #[serde(default = "default_literal_query")]
    pub literal_query: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_page_number")]
    pub page_number: u32,
}

fn default_index_id() -> String {
    "823fed26-38f9-490a-bdfc-d89e19f95a63".to_string()
}

fn default_literal_query() -> String {
    "get me wiki".to_string()
}

fn default_page_size() -> u32 {
    15
}

fn default_page_number() -> u32 {
    1
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            index_id: default_index_id(),
            endpoint: None,
            query_mode: QueryMode::default(),
            literal_query: default_literal_query(),
            page_size: default_page_size(),
            page_number: default_page_number(),
        }
    }
}

// ---------------------------------------------------------------------------
// Welcome card config
// ---------------------------------------------------------------------------

/// Welcome card shown on the elicitation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardConfig {
    #[serde(default = "default_card_title")]
    pub title: String,
    #[serde(default = "default_card_buttons")]
    pub buttons: Vec<CardButton>,
}

fn default_card_title() -> String {
    "How can I help you?".to_string()
}

fn default_card_buttons() -> Vec<CardButton> {
    vec![
        CardButton::new("Loan Application", "Loan Application"),
        CardButton::new("Loan Calculator", "Loan Calculator"),
        CardButton::new(
            "Ask GenAI",
            "What kind of questions can the Assistant answer?",
        ),
    ]
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            title: default_card_title(),
            buttons: default_card_buttons(),
        }
    }
}

// ---------------------------------------------------------------------------
// Gateway config
// ---------------------------------------------------------------------------

/// Gateway/server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

fn default_gateway_host() -> String {
    "0.0.0.0".to_string()
}

fn default_gateway_port() -> u16 {
    18080
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Root config
// ---------------------------------------------------------------------------

/// Root configuration for lexbot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub prompt: PromptTemplate,
    #[serde(default)]
    pub card: CardConfig,
    /// IANA timezone name used when stamping handled events.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: default_region(),
            llm: LlmConfig::default(),
            retrieval: RetrievalConfig::default(),
            prompt: PromptTemplate::default(),
            card: CardConfig::default(),
            timezone: default_timezone(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl Config {
    /// Completion endpoint: explicit override, otherwise derived from the
    /// configured region.
    pub fn llm_endpoint(&self) -> String {
        self.llm
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://bedrock-runtime.{}.amazonaws.com", self.region))
    }

    /// Retrieval endpoint: explicit override, otherwise derived from the
    /// configured region.
    pub fn retrieval_endpoint(&self) -> String {
        self.retrieval
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://kendra.{}.amazonaws.com", self.region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serialization_roundtrip() {
        let cfg = Config::default();
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let cfg2: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg2.llm.model, "anthropic.claude-v2");
        assert_eq!(cfg2.gateway.port, 18080);
        assert_eq!(cfg2.retrieval.index_id, "823fed26-38f9-490a-bdfc-d89e19f95a63");
    }

    #[test]
    fn test_empty_json_yields_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.region, "us-east-1");
        assert_eq!(cfg.timezone, "America/New_York");
        assert_eq!(cfg.llm.agent_max_tokens, 350);
        assert_eq!(cfg.llm.max_history_turns, 10);
        assert_eq!(cfg.retrieval.page_size, 15);
        assert_eq!(cfg.retrieval.page_number, 1);
        assert_eq!(cfg.retrieval.literal_query, "get me wiki");
    }

    #[test]
    fn test_max_history_turns_from_partial_config() {
        let cfg: Config = serde_json::from_str(r#"{"llm": {"maxHistoryTurns": 3}}"#).unwrap();
        assert_eq!(cfg.llm.max_history_turns, 3);
        assert_eq!(cfg.llm.agent_max_tokens, 350);
    }

    #[test]
    fn test_llm_endpoint_derived_from_region() {
        let mut cfg = Config::default();
        cfg.region = "eu-west-2".to_string();
        assert_eq!(
            cfg.llm_endpoint(),
            "https://bedrock-runtime.eu-west-2.amazonaws.com"
        );
    }

    #[test]
    fn test_llm_endpoint_override_wins() {
        let mut cfg = Config::default();
        cfg.llm.endpoint = Some("http://localhost:8000".to_string());
        assert_eq!(cfg.llm_endpoint(), "http://localhost:8000");
    }

    #[test]
    fn test_retrieval_endpoint_derived_from_region() {
        let cfg = Config::default();
        assert_eq!(
            cfg.retrieval_endpoint(),
            "https://kendra.us-east-1.amazonaws.com"
        );
    }

    #[test]
    fn test_query_mode_default_and_wire_form() {
        assert_eq!(QueryMode::default(), QueryMode::Literal);
        assert_eq!(
            serde_json::to_string(&QueryMode::Transcript).unwrap(),
            r#""transcript""#
        );
        let mode: QueryMode = serde_json::from_str(r#""literal""#).unwrap();
        assert_eq!(mode, QueryMode::Literal);
    }

    #[test]
    fn test_query_mode_from_partial_config() {
        let cfg: Config =
            serde_json::from_str(r#"{"retrieval": {"queryMode": "transcript"}}"#).unwrap();
        assert_eq!(cfg.retrieval.query_mode, QueryMode::Transcript);
        // Other retrieval fields still default.
        assert_eq!(cfg.retrieval.literal_query, "get me wiki");
    }

    #[test]
    fn test_default_card_buttons() {
        let card = CardConfig::default();
        assert_eq!(card.title, "How can I help you?");
        assert_eq!(card.buttons.len(), 3);
        assert_eq!(card.buttons[0].text, "Loan Application");
        assert_eq!(card.buttons[1].text, "Loan Calculator");
        assert_eq!(card.buttons[2].text, "Ask GenAI");
        assert_eq!(
            card.buttons[2].value,
            "What kind of questions can the Assistant answer?"
        );
    }

    #[test]
    fn test_endpoint_override_skipped_when_none() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(!json.contains("\"endpoint\""));
    }

    #[test]
    fn test_prompt_defaults_embedded() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.prompt.examples.len(), 3);
    }
}
