//! Dialogue types — the conversational input to the recommendation engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How many trailing messages the analyzer considers relevant (spec §3).
pub const RELEVANT_HISTORY_LEN: usize = 10;

/// How many trailing messages the heuristic keyword scan considers (spec §4.4 step 5).
pub const HEURISTIC_HISTORY_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One dialogue turn. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Ordered sequence of dialogue turns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dialogue(pub Vec<Message>);

impl Dialogue {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The last `n` messages, oldest first. Older turns may be discarded.
    pub fn last_n(&self, n: usize) -> &[Message] {
        let start = self.0.len().saturating_sub(n);
        &self.0[start..]
    }

    /// The most recent user-authored message content, if any.
    pub fn latest_user_message(&self) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    /// Lowercased concatenation of the last `n` messages' content, for
    /// keyword-scan heuristics.
    pub fn last_n_text_lower(&self, n: usize) -> String {
        self.last_n(n)
            .iter()
            .map(|m| m.content.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
