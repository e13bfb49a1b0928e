//! Persisted conversation records.
//!
//! The on-disk document is a single JSON object keyed by session id. Each
//! session keeps two parallel lists: `history` (plain user/ai pairs, read by
//! older consumers) and `messages` (the full turn records). Both are
//! appended together and never reordered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Model name recorded when no provider produced the reply.
pub const NO_PROVIDER: &str = "None";

/// Every persisted session, keyed by session id.
pub type SessionMap = BTreeMap<String, SessionRecord>;

/// One user message paired with the reply and the provider that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// What the user sent
    pub user: String,

    /// The reply text (may be a fallback message)
    pub ai: String,

    /// Provider that answered, or [`NO_PROVIDER`]
    pub model: String,

    /// When the turn was recorded
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Creates a turn stamped with the current time.
    pub fn new(user: impl Into<String>, ai: impl Into<String>, provider: Option<&str>) -> Self {
        Self {
            user: user.into(),
            ai: ai.into(),
            model: provider.unwrap_or(NO_PROVIDER).to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Plain user/assistant pair kept for backward-compatible readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub user: String,
    pub ai: String,
}

/// A named conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,

    #[serde(default)]
    pub messages: Vec<Turn>,

    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// An empty session created now.
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Appends a turn to both lists.
    pub fn push_turn(&mut self, turn: Turn) {
        self.history.push(HistoryEntry {
            user: turn.user.clone(),
            ai: turn.ai.clone(),
        });
        self.messages.push(turn);
    }

    /// The last `n` turns, oldest first.
    pub fn recent_turns(&self, n: usize) -> &[Turn] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn turn_count(&self) -> usize {
        self.messages.len()
    }

    /// Timestamp of the newest turn, if any.
    pub fn last_active(&self) -> Option<DateTime<Utc>> {
        self.messages.last().map(|t| t.timestamp)
    }
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// One row of `dada sessions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub turns: usize,
    pub created_at: DateTime<Utc>,
    pub last_active: Option<DateTime<Utc>>,
}

impl SessionSummary {
    pub fn from_record(id: &str, record: &SessionRecord) -> Self {
        Self {
            id: id.to_string(),
            turns: record.turn_count(),
            created_at: record.created_at,
            last_active: record.last_active(),
        }
    }
}
