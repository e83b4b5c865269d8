use async_trait::async_trait;
use dashmap::DashMap;

use tripbot_common::error::Error;
use tripbot_common::models::{ChatHistory, ChatTurn, MAX_HISTORY_TURNS};
use tripbot_common::traits::ChatHistoryRepository;

/// In-memory implementation of the ChatHistoryRepository trait.
/// Used when no database is configured, and in tests.
pub struct InMemoryChatHistory {
    histories: DashMap<String, ChatHistory>,
    max_turns_per_user: usize,
}

impl InMemoryChatHistory {
    /// Create a new in-memory store keeping at most `max_turns_per_user` turns
    pub fn new(max_turns_per_user: usize) -> Self {
        Self {
            histories: DashMap::new(),
            max_turns_per_user: max_turns_per_user.min(MAX_HISTORY_TURNS),
        }
    }

    pub fn user_count(&self) -> usize {
        self.histories.len()
    }
}

impl Default for InMemoryChatHistory {
    fn default() -> Self {
        Self::new(MAX_HISTORY_TURNS)
    }
}

#[async_trait]
impl ChatHistoryRepository for InMemoryChatHistory {
    async fn get(&self, user_id: &str) -> Result<Option<ChatHistory>, Error> {
        Ok(self.histories.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn append_turns(&self, user_id: &str, turns: &[ChatTurn]) -> Result<ChatHistory, Error> {
        let mut entry = self
            .histories
            .entry(user_id.to_string())
            .or_insert_with(|| ChatHistory::new(user_id));

        entry.append(turns.iter().cloned(), self.max_turns_per_user);
        Ok(entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_trims_to_cap() -> Result<(), Error> {
        let store = InMemoryChatHistory::default();
        for i in 0..8 {
            let stored = store
                .append_turns("U1", &[ChatTurn::user(format!("q{i}")), ChatTurn::model(format!("a{i}"))])
                .await?;
            assert!(stored.turns.len() <= MAX_HISTORY_TURNS);
        }

        let history = store.get("U1").await?.expect("history stored");
        assert_eq!(history.turns.len(), 10);
        assert_eq!(history.turns[0].text, "q3");
        assert!(store.get("U2").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn users_are_isolated() -> Result<(), Error> {
        let store = InMemoryChatHistory::new(4);
        store.append_turns("A", &[ChatTurn::user("a")]).await?;
        store.append_turns("B", &[ChatTurn::user("b")]).await?;
        assert_eq!(store.user_count(), 2);
        assert_eq!(store.get("A").await?.unwrap().turns.len(), 1);
        Ok(())
    }
}
