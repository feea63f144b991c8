//! Outbound envelope construction.
//!
//! Two envelope shapes leave this module: "Close with fulfilled intent" for
//! both reply paths, and "ElicitIntent with a button card" for turns that
//! stay open. The formatter's timezone is explicit configuration; it is
//! applied when stamping handled events, never by mutating process state.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use chrono::Utc;
use chrono_tz::Tz;
use tracing::debug;

use crate::config::schema::Config;
use crate::lex::event::IntentEvent;
use crate::lex::response::{
    CardButton, DialogAction, DialogActionType, LexResponse, Message, ResponseCard,
    ResponseSessionState,
};

/// Builds the outbound envelopes for the dialog service.
pub struct ResponseFormatter {
    timezone: Tz,
    card_title: String,
    buttons: Vec<CardButton>,
}

impl ResponseFormatter {
    pub fn new(timezone: Tz, card_title: &str, buttons: Vec<CardButton>) -> Self {
        Self {
            timezone,
            card_title: card_title.to_string(),
            buttons,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|_| anyhow!("Invalid timezone in config: {}", config.timezone))?;
        Ok(Self::new(
            timezone,
            &config.card.title,
            config.card.buttons.clone(),
        ))
    }

    /// Close envelope: intent marked fulfilled, exactly one plain-text
    /// message, session attributes reset to the fixed sentinel. Session id
    /// and request attributes are echoed from the event; absent request
    /// attributes are emitted as an explicit null.
    pub fn close_fulfilled(&self, event: &IntentEvent, text: &str) -> LexResponse {
        let handled_at = Utc::now().with_timezone(&self.timezone);
        debug!(
            "Closing intent {} at {}",
            event.session_state.intent.name,
            handled_at.format("%Y-%m-%d %H:%M:%S %Z")
        );

        let mut intent = event.session_state.intent.clone();
        intent.state = Some("Fulfilled".to_string());

        let mut session_attributes = HashMap::new();
        session_attributes.insert("history".to_string(), "none".to_string());

        LexResponse {
            session_state: ResponseSessionState {
                session_attributes: Some(session_attributes),
                dialog_action: DialogAction {
                    kind: DialogActionType::Close,
                },
                intent: Some(intent),
            },
            messages: vec![Message::PlainText {
                content: text.to_string(),
            }],
            session_id: Some(event.session_id.clone()),
            request_attributes: Some(event.request_attributes.clone()),
        }
    }

    /// Elicit envelope: dialog action left open, greeting text plus the
    /// configured button card. The caller's session attributes pass through
    /// untouched; there are no top-level session echo fields.
    #[allow(dead_code)]
    pub fn elicit_intent(
        &self,
        session_attributes: HashMap<String, String>,
        text: &str,
    ) -> LexResponse {
        LexResponse {
            session_state: ResponseSessionState {
                session_attributes: Some(session_attributes),
                dialog_action: DialogAction {
                    kind: DialogActionType::ElicitIntent,
                },
                intent: None,
            },
            messages: vec![
                Message::PlainText {
                    content: text.to_string(),
                },
                Message::ImageResponseCard {
                    image_response_card: ResponseCard {
                        buttons: self.buttons.clone(),
                        title: self.card_title.clone(),
                    },
                },
            ],
            session_id: None,
            request_attributes: None,
        }
    }
}
