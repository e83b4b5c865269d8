// File: tripbot-common/src/traits/repository_traits.rs

use async_trait::async_trait;
use crate::error::Error;
use crate::models::{ChatHistory, ChatTurn};

/// Per-user chat history store.
///
/// `append_turns` is a read-modify-write with no cross-delivery locking;
/// concurrent deliveries for the same user resolve as last-writer-wins.
#[async_trait]
pub trait ChatHistoryRepository: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<ChatHistory>, Error>;

    /// Merges `turns` onto the stored history, trims to the configured cap
    /// and returns the stored result.
    async fn append_turns(&self, user_id: &str, turns: &[ChatTurn]) -> Result<ChatHistory, Error>;
}
