//! Inbound intent-request event from the dialog service.
//!
//! Deserialization is strict for the fields the handler reads: a missing
//! `inputTranscript`, `invocationSource`, `sessionState`, `sessionState.intent`,
//! or `sessionId` fails the decode, mirroring the dialog service's contract
//! that these are always present. Unknown fields are ignored; fields the
//! handler merely echoes back survive the round trip untouched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Invocation-source tag for events delivered through the dialog code hook.
/// The assistant path only operates on events carrying this tag.
pub const DIALOG_CODE_HOOK: &str = "DialogCodeHook";

/// A single intent-request event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentEvent {
    /// Free-text utterance. Empty when the dialog service delivers a raw
    /// search trigger instead of a user turn.
    pub input_transcript: String,
    /// How the dialog service invoked the handler (e.g. "DialogCodeHook").
    pub invocation_source: String,
    /// Dialog session state: attributes plus the matched intent.
    pub session_state: SessionState,
    /// Dialog session identifier, echoed back in the close envelope.
    pub session_id: String,
    /// Request attributes, echoed back verbatim when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_attributes: Option<HashMap<String, String>>,
}

impl IntentEvent {
    /// Session attributes, defaulting to an empty map when the dialog
    /// service omitted them.
    #[allow(dead_code)]
    pub fn session_attributes(&self) -> HashMap<String, String> {
        self.session_state
            .session_attributes
            .clone()
            .unwrap_or_default()
    }
}

/// The `sessionState` block of an intent request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_attributes: Option<HashMap<String, String>>,
    pub intent: Intent,
}

/// Intent descriptor. Only `state` is ever written by this system; all
/// other fields (slots, confirmation state, and whatever else the dialog
/// service attaches) pass through the flattened map unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
