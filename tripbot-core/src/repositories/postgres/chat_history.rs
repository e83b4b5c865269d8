// File: tripbot-core/src/repositories/postgres/chat_history.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use sqlx::types::Json;
use tracing::debug;

use tripbot_common::models::{ChatHistory, ChatTurn, MAX_HISTORY_TURNS};
use tripbot_common::traits::repository_traits::ChatHistoryRepository;
use crate::Error;

#[derive(Clone)]
pub struct PostgresChatHistoryRepository {
    pool: Pool<Postgres>,
    max_turns: usize,
}

impl PostgresChatHistoryRepository {
    pub fn new(pool: Pool<Postgres>, max_turns: usize) -> Self {
        Self {
            pool,
            max_turns: max_turns.min(MAX_HISTORY_TURNS),
        }
    }
}

#[async_trait]
impl ChatHistoryRepository for PostgresChatHistoryRepository {
    async fn get(&self, user_id: &str) -> Result<Option<ChatHistory>, Error> {
        let row = sqlx::query(
            r#"
            SELECT user_id, turns, last_updated
            FROM chat_history
            WHERE user_id = $1
            "#,
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(r) = row {
            let Json(turns): Json<Vec<ChatTurn>> = r.try_get("turns")?;
            let last_updated: DateTime<Utc> = r.try_get("last_updated")?;
            Ok(Some(ChatHistory {
                user_id: r.try_get("user_id")?,
                turns,
                last_updated,
            }))
        } else {
            Ok(None)
        }
    }

    async fn append_turns(&self, user_id: &str, turns: &[ChatTurn]) -> Result<ChatHistory, Error> {
        // Read, merge and trim in the application, then upsert the whole array.
        // Two deliveries racing for the same user overwrite each other.
        let mut history = self
            .get(user_id)
            .await?
            .unwrap_or_else(|| ChatHistory::new(user_id));
        history.append(turns.iter().cloned(), self.max_turns);

        sqlx::query(
            r#"
            INSERT INTO chat_history (user_id, turns, last_updated)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET
               turns        = EXCLUDED.turns,
               last_updated = EXCLUDED.last_updated
            "#,
        )
            .bind(user_id)
            .bind(Json(&history.turns))
            .bind(history.last_updated)
            .execute(&self.pool)
            .await?;

        debug!("Stored {} turns for {}", history.turns.len(), user_id);
        Ok(history)
    }
}
