//! Conversation memory seam for the assistant path.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

/// One completed exchange between the user and the assistant.
#[derive(Debug, Clone)]
pub struct Turn {
    pub human: String,
    pub assistant: String,
}

/// Ordered conversation history, injected into the agent.
///
/// Two operations only: append a completed turn, read the ordered history.
/// Both are keyed by session id so concurrent sessions never see each
/// other's turns.
#[async_trait]
pub trait ConversationMemory: Send + Sync {
    /// Record one completed exchange for `session_id`.
    async fn append_turn(&self, session_id: &str, human: &str, assistant: &str);

    /// Recorded turns for `session_id`, oldest first.
    async fn history(&self, session_id: &str) -> Vec<Turn>;
}

/// Per-session history held in process memory for the lifetime of the
/// process. Each session keeps at most `max_turns` recent turns; older
/// turns are dropped on append.
pub struct InMemoryHistory {
    sessions: Mutex<HashMap<String, Vec<Turn>>>,
    max_turns: usize,
}

impl InMemoryHistory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_turns,
        }
    }
}

#[async_trait]
impl ConversationMemory for InMemoryHistory {
    async fn append_turn(&self, session_id: &str, human: &str, assistant: &str) {
        let mut sessions = self.sessions.lock().await;
        let turns = sessions.entry(session_id.to_string()).or_default();
        turns.push(Turn {
            human: human.to_string(),
            assistant: assistant.to_string(),
        });
        if turns.len() > self.max_turns {
            let excess = turns.len() - self.max_turns;
            turns.drain(..excess);
        }
    }

    async fn history(&self, session_id: &str) -> Vec<Turn> {
        let sessions = self.sessions.lock().await;
        sessions.get(session_id).cloned().unwrap_or_default()
    }
}
