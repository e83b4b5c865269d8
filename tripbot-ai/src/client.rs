use std::sync::Arc;

use tracing::{debug, warn};

use tripbot_common::error::Error;
use tripbot_common::models::{ChatTurn, MAX_HISTORY_TURNS};
use tripbot_common::traits::{ChatHistoryRepository, CompletionService};

/// Fixed preamble sent with every completion.
pub const DEFAULT_PERSONA: &str = "คุณคือผู้ช่วยวางแผนการท่องเที่ยวภาคเหนือของประเทศไทย \
ตอบเป็นภาษาไทยอย่างกระชับและเป็นมิตร เมื่อแนะนำสถานที่ให้ตอบเป็นรายการลำดับเลข \
เช่น \"1. ชื่อสถานที่: คำอธิบายสั้น ๆ\" หากผู้ใช้ขอดูรูปภาพให้ใส่คำว่า [แสดงรูปภาพ] ในคำตอบ";

/// Completion client that threads per-user chat history through every call
pub struct AiClient {
    provider: Arc<dyn CompletionService>,
    history: Arc<dyn ChatHistoryRepository>,
    persona: String,
    context_size: usize,
}

impl AiClient {
    pub fn new(
        provider: Arc<dyn CompletionService>,
        history: Arc<dyn ChatHistoryRepository>,
        persona: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            history,
            persona: persona.into(),
            context_size: MAX_HISTORY_TURNS,
        }
    }

    /// Number of prior turns sent along with each prompt (capped at 10).
    pub fn with_context_size(mut self, context_size: usize) -> Self {
        self.context_size = context_size.min(MAX_HISTORY_TURNS);
        self
    }

    pub fn history(&self) -> Arc<dyn ChatHistoryRepository> {
        self.history.clone()
    }

    /// Chat with user context from history.
    ///
    /// The history read and the append that follows are not atomic; a store
    /// failure on either side is logged and the completion still proceeds.
    pub async fn chat_with_user_context(&self, user_id: &str, message: &str) -> Result<String, Error> {
        let prior = match self.history.get(user_id).await {
            Ok(Some(h)) => h.recent(self.context_size).to_vec(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not load chat history for {}: {}", user_id, e);
                Vec::new()
            }
        };
        debug!("Completing for user {} with {} prior turns", user_id, prior.len());

        let response = self.provider.complete(&self.persona, &prior, message).await?;

        let turns = [ChatTurn::user(message), ChatTurn::model(response.clone())];
        if let Err(e) = self.history.append_turns(user_id, &turns).await {
            warn!("Could not store chat history for {}: {}", user_id, e);
        }

        Ok(response)
    }
}
