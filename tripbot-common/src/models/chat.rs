// File: tripbot-common/src/models/chat.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on stored turns per user.
pub const MAX_HISTORY_TURNS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// One side of an exchange with the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: ChatRole::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: ChatRole::Model, text: text.into() }
    }
}

/// Bounded per-user conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatHistory {
    pub user_id: String,
    pub turns: Vec<ChatTurn>,
    pub last_updated: DateTime<Utc>,
}

impl ChatHistory {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            turns: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// Appends turns in order, then drops the oldest until at most `limit`
    /// (itself capped at [`MAX_HISTORY_TURNS`]) remain.
    pub fn append(&mut self, turns: impl IntoIterator<Item = ChatTurn>, limit: usize) {
        self.turns.extend(turns);
        self.trim(limit);
        self.last_updated = Utc::now();
    }

    pub fn trim(&mut self, limit: usize) {
        let limit = limit.min(MAX_HISTORY_TURNS);
        if self.turns.len() > limit {
            let excess = self.turns.len() - limit;
            self.turns.drain(..excess);
        }
    }

    /// The newest `limit` turns, oldest first.
    pub fn recent(&self, limit: usize) -> &[ChatTurn] {
        let start = self.turns.len().saturating_sub(limit);
        &self.turns[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_never_exceeds_cap() {
        let mut history = ChatHistory::new("U1");
        for i in 0..25 {
            history.append([ChatTurn::user(format!("q{i}")), ChatTurn::model(format!("a{i}"))], 10);
            assert!(history.turns.len() <= MAX_HISTORY_TURNS);
        }
        assert_eq!(history.turns.len(), 10);
        assert_eq!(history.turns.last().map(|t| t.text.as_str()), Some("a24"));
        assert_eq!(history.turns.first().map(|t| t.text.as_str()), Some("q20"));
    }

    #[test]
    fn limit_above_cap_is_clamped() {
        let mut history = ChatHistory::new("U1");
        history.append((0..30).map(|i| ChatTurn::user(i.to_string())), 50);
        assert_eq!(history.turns.len(), MAX_HISTORY_TURNS);
    }

    #[test]
    fn recent_returns_tail() {
        let mut history = ChatHistory::new("U1");
        history.append([ChatTurn::user("a"), ChatTurn::model("b"), ChatTurn::user("c")], 10);
        let tail = history.recent(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].text, "b");
        assert_eq!(history.recent(99).len(), 3);
    }
}
