//! Outbound response envelope for the dialog service.
//!
//! Two shapes share one struct: "Close with fulfilled intent + one text
//! message" and "ElicitIntent + text message + button card". Fields absent
//! from a shape are skipped during serialization so each envelope matches
//! the dialog service's wire format exactly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::lex::event::Intent;

/// Response envelope returned to the dialog service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexResponse {
    pub session_state: ResponseSessionState,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Close envelopes always carry this key, serialized as `null` when the
    /// inbound event had no request attributes. Elicit envelopes omit the
    /// key entirely. Outer `None` skips the key, `Some(None)` emits `null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_attributes: Option<Option<HashMap<String, String>>>,
}

impl LexResponse {
    /// The content of the first plain-text message block, if any.
    #[allow(dead_code)]
    pub fn first_text(&self) -> Option<&str> {
        self.messages.iter().find_map(|m| match m {
            Message::PlainText { content } => Some(content.as_str()),
            _ => None,
        })
    }
}

/// `sessionState` block of the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_attributes: Option<HashMap<String, String>>,
    pub dialog_action: DialogAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
}

/// Dialog action directive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogAction {
    #[serde(rename = "type")]
    pub kind: DialogActionType,
}

/// Dialog action kinds this system emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogActionType {
    Close,
    ElicitIntent,
}

// ---------------------------------------------------------------------------
// Message blocks
// ---------------------------------------------------------------------------

/// A single message block. The `contentType` tag selects the variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "contentType")]
pub enum Message {
    PlainText {
        content: String,
    },
    ImageResponseCard {
        #[serde(rename = "imageResponseCard")]
        image_response_card: ResponseCard,
    },
}

/// Interactive button card attached to an elicit response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseCard {
    pub buttons: Vec<CardButton>,
    pub title: String,
}

/// One button on a response card. `text` is the label shown to the user,
/// `value` is the utterance sent back when pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardButton {
    pub text: String,
    pub value: String,
}

impl CardButton {
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }
}
